//! Core logger types and traits

pub mod configuration;
pub mod context_provider;
pub mod dispatch;
pub mod error;
pub mod error_handler;
pub mod log_entry;
pub mod log_level;
pub mod log_provider;
pub mod logger;
pub mod metrics;
pub mod sanitizer;

pub use configuration::{
    LiveConfiguration, LoggerConfiguration, LoggerSettings, DEFAULT_CONCURRENCY_LEVEL,
};
pub use context_provider::ContextProvider;
pub use dispatch::{DispatchMode, LogDispatch};
pub use error::{LoggerError, ProviderFailure, Result};
pub use error_handler::{ErrorCallback, ErrorReport, ErrorReporter};
pub use log_entry::{CallerInfo, ExceptionInfo, ExtendedProperties, LogEntry};
pub use log_level::LogLevel;
pub use log_provider::LogProvider;
pub use logger::{Logger, LoggerBuilder, DEFAULT_LOGGER_NAME, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use sanitizer::{PropertySanitizer, RedactKeys};
