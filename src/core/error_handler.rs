//! Error-reporting side channel
//!
//! Dispatch never returns a sink's or enricher's failure through normal
//! control flow. Instead every such failure is delivered here, to a host
//! supplied callback, or to stderr when no callback is installed.

use super::error::LoggerError;
use super::log_entry::CallerInfo;
use super::log_level::LogLevel;
use std::fmt;
use std::sync::Arc;

/// A failure observed by the logging core
#[derive(Debug)]
pub struct ErrorReport<'a> {
    /// Name of the logger (or requested logger, for reloads) involved
    pub logger: &'a str,
    pub error: &'a LoggerError,
    /// Level of the entry being dispatched, when there was one
    pub level: Option<LogLevel>,
    /// Caller location supplied with the log call, if any
    pub caller: Option<&'a CallerInfo>,
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "logger '{}': {}", self.logger, self.error)?;
        if let Some(caller) = self.caller {
            write!(f, " [at {}]", caller)?;
        }
        Ok(())
    }
}

/// Callback type for error notifications
pub type ErrorCallback = Arc<dyn Fn(&ErrorReport<'_>) + Send + Sync>;

/// Delivers reports to the configured callback
#[derive(Clone, Default)]
pub struct ErrorReporter {
    callback: Option<ErrorCallback>,
}

impl ErrorReporter {
    pub fn new(callback: Option<ErrorCallback>) -> Self {
        Self { callback }
    }

    pub fn callback(&self) -> Option<&ErrorCallback> {
        self.callback.as_ref()
    }

    pub fn report(&self, report: &ErrorReport<'_>) {
        match self.callback {
            Some(ref callback) => {
                let delivered = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    callback(report)
                }));
                if delivered.is_err() {
                    eprintln!("[LOGGER CRITICAL] Error callback panicked while reporting: {}", report);
                }
            }
            None => eprintln!("[LOGGER ERROR] {}", report),
        }
    }

    /// Shorthand for reports that are not tied to an entry
    pub fn report_error(&self, logger: &str, error: &LoggerError) {
        self.report(&ErrorReport {
            logger,
            error,
            level: None,
            caller: None,
        });
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
