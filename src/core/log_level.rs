//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry.
///
/// Real levels are ordered `Debug < Info < Warn < Error < Fatal`. Two levels
/// sit outside that scale: `NotSet` (no level assigned, never enabled) and
/// `Audit` (always enabled while logging is on). Their ordinals are the
/// lowest and highest respectively, so a configured threshold of `NotSet`
/// lets every real level through and a threshold of `Audit` blocks them all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    #[default]
    NotSet = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Audit = 6,
}

impl LogLevel {
    /// The five levels that participate in threshold comparison.
    pub const REAL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Every level, sentinels included.
    pub const ALL: [LogLevel; 7] = [
        LogLevel::NotSet,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Audit,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::NotSet => "NOTSET",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Audit => "AUDIT",
        }
    }

    /// Whether an entry at this level passes a gate configured with `threshold`.
    ///
    /// Does not consult the global enabled flag; see
    /// [`LoggerConfiguration`](crate::core::LoggerConfiguration).
    #[inline]
    pub fn passes(self, threshold: LogLevel) -> bool {
        match self {
            LogLevel::NotSet => false,
            LogLevel::Audit => true,
            level => level >= threshold,
        }
    }

    /// Whether this is one of the ordered real levels.
    #[inline]
    pub fn is_real(self) -> bool {
        !matches!(self, LogLevel::NotSet | LogLevel::Audit)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::NotSet => White,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
            LogLevel::Audit => Magenta,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NOTSET" | "NONE" | "" => Ok(LogLevel::NotSet),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "AUDIT" => Ok(LogLevel::Audit),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.to_str().to_string()
    }
}
