//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The level gate is
//! checked before the message is formatted, the call site is captured as
//! [`CallerInfo`](crate::core::CallerInfo), and the entry is dispatched
//! detached, so the macros work from synchronous code.
//!
//! The logger argument may be anything that implements
//! [`LogDispatch`](crate::core::LogDispatch) or derefs to it: a `Logger`, an
//! `Arc<ReloadingLogger>`, an `Arc<dyn LogDispatch>`.
//!
//! # Examples
//!
//! ```
//! use rust_logger_core::prelude::*;
//! use rust_logger_core::info;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! # }
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::new();
/// use rust_logger_core::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// # }
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::core::LogDispatch as _;
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.is_enabled(level) {
            logger.log_detached(
                $crate::LogEntry::new(level, format!($($arg)+)),
                Some($crate::CallerInfo::new(module_path!(), file!(), line!())),
            );
        }
    }};
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::builder().min_level(LogLevel::Debug).build();
/// use rust_logger_core::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// # }
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::new();
/// use rust_logger_core::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// # }
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::new();
/// use rust_logger_core::warn;
/// warn!(logger, "Configuration file not found, using defaults");
/// warn!(logger, "Memory usage: {}%", 85);
/// # }
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::new();
/// use rust_logger_core::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// # }
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::new();
/// use rust_logger_core::fatal;
/// fatal!(logger, "Critical system failure");
/// # }
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log an audit entry; passes any level threshold while logging is enabled.
///
/// # Examples
///
/// ```
/// # use rust_logger_core::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// # let logger = Logger::builder().min_level(LogLevel::Fatal).build();
/// use rust_logger_core::audit;
/// audit!(logger, "User {} changed role to {}", 42, "admin");
/// # }
/// ```
#[macro_export]
macro_rules! audit {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Audit, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogDispatch, LogLevel, Logger};
    use crate::providers::MemoryLogProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_macros_format_and_capture_caller() {
        let memory = MemoryLogProvider::new();
        let logger = Logger::builder()
            .min_level(LogLevel::Info)
            .provider(memory.clone())
            .build();

        crate::debug!(logger, "hidden {}", 1);
        crate::info!(logger, "Processing {} items", 100);
        crate::audit!(logger, "role change");
        logger.wait_idle().await;

        let entries = memory.entries();
        assert_eq!(entries.len(), 2);
        let messages: Vec<_> = entries.iter().map(|e| e.message_or_empty()).collect();
        assert!(messages.contains(&"Processing 100 items"));
        assert!(messages.contains(&"role change"));

        let caller = entries[0].caller.as_ref().unwrap();
        assert!(caller.file_path.as_deref().unwrap().ends_with("macros.rs"));
        assert_eq!(caller.member_name.as_deref(), Some(module_path!()));
    }

    #[tokio::test]
    async fn test_macros_accept_trait_objects() {
        let memory = MemoryLogProvider::new();
        let concrete = Arc::new(Logger::builder().provider(memory.clone()).build());
        let handle: Arc<dyn LogDispatch> = concrete.clone();

        crate::warn!(handle, "via {}", "trait object");
        crate::error!(concrete, "via arc");
        concrete.wait_idle().await;

        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        struct Explodes;
        impl std::fmt::Display for Explodes {
            fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                panic!("formatted a filtered message");
            }
        }

        let logger = Logger::builder().min_level(LogLevel::Error).build();
        crate::info!(logger, "{}", Explodes);
        assert_eq!(logger.metrics().dispatched_count(), 0);
    }
}
