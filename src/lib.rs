//! # Rust Logger Core
//!
//! An application-embedded logging core: a level gate, context enrichment,
//! and bounded-concurrency fan-out to independent log providers, plus
//! configuration-driven loggers that follow configuration changes.
//!
//! ## Features
//!
//! - **Isolated fan-out**: each provider write runs in its own task, so a
//!   failing or panicking provider never affects the others
//! - **Blocking or detached dispatch**: wait for every provider or return
//!   immediately, per call or per logger
//! - **Hot reload**: [`ReloadingLogger`] handles swap to a rebuilt logger when
//!   their definition changes
//! - **Failure reporting**: provider, enrichment and reload failures go to a
//!   single error callback
//!
//! ## Quick start
//!
//! ```
//! use rust_logger_core::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let config = LoggingConfiguration::new(ConfigSection::root(json!({
//!     "name": "app",
//!     "level": "Info",
//!     "contextProviders": "thread"
//! })));
//!
//! let logger = config.resolve("app")?;
//! logger
//!     .log(LogEntry::new(LogLevel::Info, "started"), Some(DispatchMode::Blocking), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod core;
pub mod diagnostics;
pub mod macros;
pub mod providers;

pub mod prelude {
    pub use crate::config::{ConfigSection, LoggingConfiguration, ProviderRegistry, ReloadingLogger};
    pub use crate::context::{ContextGuard, StaticContextProvider, ThreadContextProvider};
    pub use crate::core::{
        CallerInfo, ContextProvider, DispatchMode, ErrorCallback, ErrorReport, ExceptionInfo,
        ExtendedProperties, LiveConfiguration, LogDispatch, LogEntry, LogLevel, LogProvider,
        Logger, LoggerBuilder, LoggerConfiguration, LoggerError, LoggerMetrics, LoggerSettings,
        PropertySanitizer, RedactKeys, Result, DEFAULT_LOGGER_NAME, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::diagnostics::{StepLogger, STEP_REPORT_KEY};
    #[cfg(feature = "console")]
    pub use crate::providers::ConsoleLogProvider;
    pub use crate::providers::MemoryLogProvider;
    #[cfg(feature = "file")]
    pub use crate::providers::{FileFormat, FileLogProvider};
}

pub use config::{ConfigSection, LoggingConfiguration, ProviderRegistry, ReloadingLogger};
pub use core::{
    CallerInfo, ContextProvider, DispatchMode, ErrorCallback, ErrorReport, ExceptionInfo,
    ExtendedProperties, LogDispatch, LogEntry, LogLevel, LogProvider, Logger, LoggerBuilder,
    LoggerConfiguration, LoggerError, LoggerMetrics, LoggerSettings, Result, DEFAULT_LOGGER_NAME,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use providers::MemoryLogProvider;
