//! Context provider trait for entry enrichment

use super::{error::Result, log_entry::ExtendedProperties, log_entry::LogEntry};

/// Synchronously contributes extended properties to an entry before dispatch.
///
/// Returned properties are merged into the entry in registration order, so a
/// later provider overwrites keys set by an earlier one. An error or panic is
/// reported and skipped; it never aborts the log call.
pub trait ContextProvider: Send + Sync {
    fn contribute(&self, entry: &LogEntry) -> Result<ExtendedProperties>;
    fn name(&self) -> &str;
}
