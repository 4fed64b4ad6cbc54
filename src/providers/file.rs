//! File provider for non-blocking log file writing
//!
//! Uses tokio::fs for fully asynchronous file I/O. The file is opened on the
//! first write so the provider can be built from synchronous code, such as a
//! configuration factory.

use super::text_line;
use crate::config::ConfigSection;
use crate::core::{LogEntry, LoggerError, LogProvider, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Line format written by [`FileLogProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Human-readable single line per entry
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Settings accepted by the `file` provider kind
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSettings {
    pub path: PathBuf,
    #[serde(default)]
    pub format: FileFormat,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_auto_flush")]
    pub auto_flush: bool,
}

fn default_buffer_size() -> usize {
    FileLogProvider::DEFAULT_BUFFER_SIZE
}

fn default_auto_flush() -> bool {
    true
}

/// Appends entries to a file
///
/// With `auto_flush` disabled, buffered data (up to `buffer_size` bytes) is
/// only guaranteed on disk after [`LogProvider::flush`]; `Logger::shutdown`
/// calls it for you.
///
/// # Example
///
/// ```no_run
/// use rust_logger_core::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let provider = FileLogProvider::new("logs/app.log").with_format(FileFormat::Json);
///
/// provider.write(&LogEntry::new(LogLevel::Info, "Hello async world!")).await?;
/// provider.flush().await?;
/// # Ok(())
/// # }
/// ```
pub struct FileLogProvider {
    path: PathBuf,
    format: FileFormat,
    buffer_size: usize,
    auto_flush: bool,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileLogProvider {
    /// Default buffer size (64 KB)
    pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: FileFormat::Text,
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            auto_flush: true,
            writer: Mutex::new(None),
        }
    }

    /// Build from a provider settings subtree
    pub fn from_section(section: &ConfigSection) -> Result<Self> {
        let settings: FileSettings = section.bind()?;
        if settings.buffer_size == 0 {
            return Err(LoggerError::config("file provider", "bufferSize must be greater than zero"));
        }
        Ok(Self::new(settings.path)
            .with_format(settings.format)
            .with_buffer_size(settings.buffer_size)
            .with_auto_flush(settings.auto_flush))
    }

    #[must_use]
    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    async fn open(&self) -> Result<BufWriter<File>> {
        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        Ok(BufWriter::with_capacity(self.buffer_size, file))
    }

    fn render(&self, entry: &LogEntry) -> Result<String> {
        let mut line = match self.format {
            FileFormat::Text => text_line(entry, &format!("{:5}", entry.level.to_str())),
            FileFormat::Json => serde_json::to_string(entry)?,
        };
        line.push('\n');
        Ok(line)
    }
}

#[async_trait]
impl LogProvider for FileLogProvider {
    async fn write(&self, entry: &LogEntry) -> Result<()> {
        let line = self.render(entry)?;

        let mut guard = self.writer.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        let writer = guard
            .as_mut()
            .ok_or_else(|| LoggerError::writer("log file is not open"))?;

        writer.write_all(line.as_bytes()).await?;
        if self.auto_flush {
            writer.flush().await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        if let Some(writer) = self.writer.lock().await.as_mut() {
            writer.flush().await.map_err(LoggerError::from)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallerInfo, LogLevel};
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_text_write() {
        let dir = tempdir().expect("Failed to create temp dir");
        let log_path = dir.path().join("nested").join("test.log");

        let provider = FileLogProvider::new(&log_path);
        let entry = LogEntry::new(LogLevel::Info, "Test message")
            .with_caller(CallerInfo::new("run", "test.rs", 42));
        provider.write(&entry).await.expect("Failed to write");

        let content = tokio::fs::read_to_string(&log_path)
            .await
            .expect("Failed to read log file");

        assert!(content.contains("Test message"));
        assert!(content.contains("INFO"));
        assert!(content.contains("test.rs:42"));
    }

    #[tokio::test]
    async fn test_json_lines() {
        let dir = tempdir().expect("Failed to create temp dir");
        let log_path = dir.path().join("test.jsonl");

        let provider = FileLogProvider::new(&log_path)
            .with_format(FileFormat::Json)
            .with_auto_flush(false);

        for i in 0..10 {
            let entry = LogEntry::new(LogLevel::Warn, format!("Message {}", i)).with_property("i", i);
            provider.write(&entry).await.expect("Failed to write");
        }
        provider.flush().await.expect("Failed to flush");

        let content = tokio::fs::read_to_string(&log_path)
            .await
            .expect("Failed to read log file");

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 10);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], json!("Message 0"));
        assert_eq!(first["extendedProperties"]["i"], json!(0));
    }

    #[test]
    fn test_from_section() {
        let section = ConfigSection::from_value(
            "value",
            json!({ "path": "logs/app.log", "format": "json", "bufferSize": 1024 }),
        );
        let provider = FileLogProvider::from_section(&section).unwrap();

        assert_eq!(provider.path(), Path::new("logs/app.log"));
        assert_eq!(provider.format(), FileFormat::Json);
        assert_eq!(provider.buffer_size(), 1024);
    }

    #[test]
    fn test_from_section_ignores_key_case() {
        let section = ConfigSection::from_value(
            "value",
            json!({ "Path": "logs/app.log", "Format": "json", "BufferSize": 2048, "AutoFlush": false }),
        );
        let provider = FileLogProvider::from_section(&section).unwrap();

        assert_eq!(provider.format(), FileFormat::Json);
        assert_eq!(provider.buffer_size(), 2048);
        assert!(!provider.auto_flush);

        let zero = ConfigSection::from_value("value", json!({ "PATH": "x.log", "BUFFERSIZE": 0 }));
        assert!(FileLogProvider::from_section(&zero).is_err());
    }

    #[test]
    fn test_from_section_requires_path() {
        let section = ConfigSection::from_value("value", json!({ "format": "text" }));
        assert!(matches!(
            FileLogProvider::from_section(&section),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }
}
