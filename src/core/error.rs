//! Error types for the logger core

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// A single provider write that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Position of the provider in the logger's provider list
    pub index: usize,
    /// Name reported by the provider
    pub provider: String,
    pub message: String,
    /// The write panicked instead of returning an error
    pub panicked: bool,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.panicked {
            write!(f, "provider #{} '{}' panicked: {}", self.index, self.provider, self.message)
        } else {
            write!(f, "provider #{} '{}' failed: {}", self.index, self.provider, self.message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// No logger definition matched the requested name
    #[error("No loggers were found matching the name '{name}'.")]
    LoggerNotFound { name: String },

    /// A log provider returned an error from `write`
    #[error("Log provider '{provider}' failed to write: {message}")]
    ProviderWrite { provider: String, message: String },

    /// A log provider panicked during `write`
    #[error("Log provider '{provider}' panicked: {message}")]
    ProviderPanicked { provider: String, message: String },

    /// One or more providers failed during a blocking dispatch
    #[error("{} log provider(s) failed: {}", .failures.len(), join_failures(.failures))]
    DispatchFailed { failures: Vec<ProviderFailure> },

    /// A context provider failed while enriching an entry
    #[error("Context provider '{provider}' failed: {message}")]
    ContextProvider { provider: String, message: String },

    /// Rebuilding a logger after a configuration change failed
    #[error("Failed to reload logger '{name}': {message}")]
    ReloadFailed { name: String, message: String },

    /// Configuration named a provider kind that is not registered
    #[error("Unknown {kind} type '{type_name}'")]
    UnknownProviderType { kind: String, type_name: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Logger already stopped
    #[error("Logger already stopped")]
    LoggerStopped,

    /// A detached dispatch was requested outside a tokio runtime
    #[error("No async runtime available for detached dispatch")]
    NoRuntime,

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ProviderFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create a lookup error for a missing logger definition
    pub fn logger_not_found(name: impl Into<String>) -> Self {
        LoggerError::LoggerNotFound { name: name.into() }
    }

    /// Create a provider write error
    pub fn provider_write(provider: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ProviderWrite {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a context provider error
    pub fn context_provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ContextProvider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a reload error
    pub fn reload(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ReloadFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unknown provider type error
    pub fn unknown_type(kind: impl Into<String>, type_name: impl Into<String>) -> Self {
        LoggerError::UnknownProviderType {
            kind: kind.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Provider failures carried by a `DispatchFailed` error, empty otherwise
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            LoggerError::DispatchFailed { failures } => failures,
            _ => &[],
        }
    }
}

impl From<ProviderFailure> for LoggerError {
    fn from(failure: ProviderFailure) -> Self {
        if failure.panicked {
            LoggerError::ProviderPanicked {
                provider: failure.provider,
                message: failure.message,
            }
        } else {
            LoggerError::ProviderWrite {
                provider: failure.provider,
                message: failure.message,
            }
        }
    }
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
