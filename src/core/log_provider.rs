//! Log provider trait for output destinations

use super::{error::Result, log_entry::LogEntry};
use async_trait::async_trait;

/// Asynchronous destination for log entries
///
/// Providers are shared between concurrent dispatches, so `write` takes
/// `&self`; implementations guard their own mutable state.
///
/// # Example
///
/// ```no_run
/// use rust_logger_core::core::{LogEntry, LogProvider, Result};
/// use async_trait::async_trait;
///
/// struct StdoutProvider;
///
/// #[async_trait]
/// impl LogProvider for StdoutProvider {
///     async fn write(&self, entry: &LogEntry) -> Result<()> {
///         println!("{} {}", entry.level, entry.message_or_empty());
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "stdout"
///     }
/// }
/// ```
#[async_trait]
pub trait LogProvider: Send + Sync {
    /// Write a log entry
    async fn write(&self, entry: &LogEntry) -> Result<()>;

    /// Flush buffered entries
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Get the provider name
    fn name(&self) -> &str;
}
