//! Console provider implementation

use super::text_line;
use crate::config::ConfigSection;
use crate::core::{LogEntry, LogLevel, LogProvider, Result};
use async_trait::async_trait;
use colored::Colorize;
use serde::Deserialize;
use std::io::Write;

/// Settings accepted by the `console` provider kind
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleSettings {
    pub colors: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self { colors: true }
    }
}

/// Writes one text line per entry to stdout, or stderr for Error and above
pub struct ConsoleLogProvider {
    use_colors: bool,
}

impl ConsoleLogProvider {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Build from a provider settings subtree
    pub fn from_section(section: &ConfigSection) -> Result<Self> {
        let settings: ConsoleSettings = section.bind()?;
        Ok(Self::with_colors(settings.colors))
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    fn format(&self, entry: &LogEntry) -> String {
        let level = format!("{:5}", entry.level.to_str());
        if self.use_colors {
            text_line(entry, &level.color(entry.level.color_code()).to_string())
        } else {
            text_line(entry, &level)
        }
    }
}

impl Default for ConsoleLogProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogProvider for ConsoleLogProvider {
    async fn write(&self, entry: &LogEntry) -> Result<()> {
        let output = self.format(entry);

        // Route Error, Fatal and Audit to stderr, others to stdout
        match entry.level {
            LogLevel::Error | LogLevel::Fatal | LogLevel::Audit => {
                writeln!(std::io::stderr().lock(), "{}", output)?
            }
            _ => writeln!(std::io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_format() {
        let provider = ConsoleLogProvider::with_colors(false);
        let line = provider.format(&LogEntry::new(LogLevel::Info, "line1\nline2"));
        assert!(line.contains("[INFO ] line1\\nline2"));
    }

    #[test]
    fn test_from_section() {
        let section = ConfigSection::from_value("value", json!({ "colors": false }));
        let provider = ConsoleLogProvider::from_section(&section).unwrap();
        assert!(!provider.uses_colors());

        let pascal = ConfigSection::from_value("value", json!({ "Colors": false }));
        assert!(!ConsoleLogProvider::from_section(&pascal).unwrap().uses_colors());

        let defaults = ConfigSection::from_value("value", json!(null));
        assert!(ConsoleLogProvider::from_section(&defaults).unwrap().uses_colors());
    }

    #[tokio::test]
    async fn test_write_succeeds() {
        let provider = ConsoleLogProvider::with_colors(false);
        provider
            .write(&LogEntry::new(LogLevel::Debug, "console test"))
            .await
            .unwrap();
        provider.flush().await.unwrap();
    }
}
