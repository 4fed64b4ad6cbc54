//! Operations shared by loggers and logger handles

use super::{error::Result, log_entry::CallerInfo, log_entry::LogEntry, log_level::LogLevel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Whether a log call waits for its provider writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Return only after every provider write has finished
    Blocking,
    /// Return immediately; providers write in the background
    Detached,
}

impl DispatchMode {
    pub fn from_block_until_complete(block: bool) -> Self {
        if block {
            DispatchMode::Blocking
        } else {
            DispatchMode::Detached
        }
    }
}

/// Gate and dispatch operations
///
/// Implemented by [`Logger`](super::Logger) and by the reloading handle
/// returned from the configuration registry, so application code can hold
/// either behind `Arc<dyn LogDispatch>`.
#[async_trait]
pub trait LogDispatch: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap check to run before building an entry
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Enrich and fan out `entry`
    ///
    /// `mode: None` uses the configured default. Blocking calls report
    /// provider failures through `Err(LoggerError::DispatchFailed)` in
    /// addition to the error channel; detached calls always return `Ok`.
    async fn log(
        &self,
        entry: LogEntry,
        mode: Option<DispatchMode>,
        caller: Option<CallerInfo>,
    ) -> Result<()>;

    /// Detached dispatch usable from synchronous code
    fn log_detached(&self, entry: LogEntry, caller: Option<CallerInfo>);

    /// Flush every provider
    async fn flush(&self) -> Result<()>;
}
