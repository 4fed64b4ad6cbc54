//! Logger configuration capability
//!
//! A [`Logger`](super::Logger) reads its configuration on every call, so an
//! implementation backed by mutable state (such as [`LiveConfiguration`])
//! retunes a running logger without rebuilding it.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default maximum number of simultaneous provider writes per dispatch
pub const DEFAULT_CONCURRENCY_LEVEL: usize = 4;

/// Read-only view of the values that drive gating and dispatch
pub trait LoggerConfiguration: Send + Sync {
    /// Global kill switch
    fn is_logging_enabled(&self) -> bool;

    /// Minimum level threshold
    fn logging_level(&self) -> LogLevel;

    /// Maximum number of provider writes in flight per dispatch
    fn concurrency_level(&self) -> usize;

    /// Dispatch mode used when a caller does not pick one
    fn block_until_complete(&self) -> bool {
        true
    }

    /// Level gate
    ///
    /// `NotSet` is never enabled, `Audit` is always enabled while logging is
    /// on, and every real level is compared against [`logging_level`].
    /// A threshold of `NotSet` filters nothing.
    ///
    /// [`logging_level`]: LoggerConfiguration::logging_level
    #[inline]
    fn is_enabled(&self, level: LogLevel) -> bool {
        self.is_logging_enabled() && level.passes(self.logging_level())
    }
}

/// Plain snapshot of logger settings, bindable from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerSettings {
    pub level: LogLevel,
    pub is_disabled: bool,
    pub concurrency_level: usize,
    pub block_until_complete: bool,
}

impl LoggerSettings {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.is_disabled = true;
        self
    }

    #[must_use]
    pub fn with_concurrency_level(mut self, concurrency_level: usize) -> Self {
        self.concurrency_level = concurrency_level;
        self
    }

    #[must_use]
    pub fn with_block_until_complete(mut self, block: bool) -> Self {
        self.block_until_complete = block;
        self
    }

    /// Reject settings the dispatch engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_level == 0 {
            return Err(LoggerError::config(
                "concurrencyLevel",
                "must be a positive integer",
            ));
        }
        Ok(())
    }
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::NotSet,
            is_disabled: false,
            concurrency_level: DEFAULT_CONCURRENCY_LEVEL,
            block_until_complete: true,
        }
    }
}

impl LoggerConfiguration for LoggerSettings {
    fn is_logging_enabled(&self) -> bool {
        !self.is_disabled
    }

    fn logging_level(&self) -> LogLevel {
        self.level
    }

    fn concurrency_level(&self) -> usize {
        self.concurrency_level
    }

    fn block_until_complete(&self) -> bool {
        self.block_until_complete
    }
}

/// Settings that can be changed while loggers are running
///
/// Thread-safe: share it through an `Arc` between the logger and whatever
/// code tunes it.
#[derive(Debug, Default)]
pub struct LiveConfiguration {
    settings: RwLock<LoggerSettings>,
}

impl LiveConfiguration {
    pub fn new(settings: LoggerSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    pub fn snapshot(&self) -> LoggerSettings {
        self.settings.read().clone()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.settings.write().is_disabled = !enabled;
    }

    pub fn set_level(&self, level: LogLevel) {
        self.settings.write().level = level;
    }

    pub fn set_concurrency_level(&self, concurrency_level: usize) -> Result<()> {
        let mut settings = self.settings.write();
        let candidate = LoggerSettings {
            concurrency_level,
            ..settings.clone()
        };
        candidate.validate()?;
        *settings = candidate;
        Ok(())
    }

    pub fn set_block_until_complete(&self, block: bool) {
        self.settings.write().block_until_complete = block;
    }

    /// Replace every setting at once
    pub fn replace(&self, settings: LoggerSettings) -> Result<()> {
        settings.validate()?;
        *self.settings.write() = settings;
        Ok(())
    }
}

impl LoggerConfiguration for LiveConfiguration {
    fn is_logging_enabled(&self) -> bool {
        !self.settings.read().is_disabled
    }

    fn logging_level(&self) -> LogLevel {
        self.settings.read().level
    }

    fn concurrency_level(&self) -> usize {
        self.settings.read().concurrency_level
    }

    fn block_until_complete(&self) -> bool {
        self.settings.read().block_until_complete
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        let settings = self.settings.read();
        !settings.is_disabled && level.passes(settings.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LoggerSettings::default();
        assert_eq!(settings.level, LogLevel::NotSet);
        assert!(settings.is_logging_enabled());
        assert_eq!(settings.concurrency_level(), DEFAULT_CONCURRENCY_LEVEL);
        assert!(settings.block_until_complete());
    }

    #[test]
    fn test_disabled_blocks_audit() {
        let settings = LoggerSettings::new(LogLevel::Debug).disabled();
        assert!(!settings.is_enabled(LogLevel::Audit));
        assert!(!settings.is_enabled(LogLevel::Fatal));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let settings = LoggerSettings::default().with_concurrency_level(0);
        assert!(matches!(
            settings.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        let live = LiveConfiguration::default();
        assert!(live.set_concurrency_level(0).is_err());
        assert_eq!(live.concurrency_level(), DEFAULT_CONCURRENCY_LEVEL);
    }

    #[test]
    fn test_live_configuration_updates() {
        let live = LiveConfiguration::new(LoggerSettings::new(LogLevel::Error));
        assert!(!live.is_enabled(LogLevel::Warn));

        live.set_level(LogLevel::Warn);
        assert!(live.is_enabled(LogLevel::Warn));

        live.set_enabled(false);
        assert!(!live.is_enabled(LogLevel::Audit));
    }

    #[test]
    fn test_settings_bind_from_json() {
        let settings: LoggerSettings = serde_json::from_value(serde_json::json!({
            "level": "warn",
            "concurrencyLevel": 3,
            "blockUntilComplete": false
        }))
        .unwrap();

        assert_eq!(settings.level, LogLevel::Warn);
        assert_eq!(settings.concurrency_level, 3);
        assert!(!settings.block_until_complete);
        assert!(!settings.is_disabled);
    }
}
