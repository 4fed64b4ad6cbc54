//! Process-wide default logging configuration
//!
//! The default may be replaced with [`set_configuration`] until the first
//! time it is read; from then on it is fixed for the life of the process.
//! Without an explicit configuration the default is an empty tree, which
//! defines a single provider-less logger named
//! [`DEFAULT_LOGGER_NAME`](crate::core::DEFAULT_LOGGER_NAME).

use super::registry::LoggingConfiguration;
use super::reloading::ReloadingLogger;
use super::section::ConfigSection;
use crate::core::{LoggerError, Result, DEFAULT_LOGGER_NAME};
use parking_lot::{const_mutex, Mutex};
use std::sync::Arc;

struct DefaultState {
    configuration: Option<LoggingConfiguration>,
    locked: bool,
}

static DEFAULT: Mutex<DefaultState> = const_mutex(DefaultState {
    configuration: None,
    locked: false,
});

/// Install the process-wide default configuration
///
/// # Errors
///
/// [`LoggerError::InvalidConfiguration`] once the default has been read.
pub fn set_configuration(configuration: LoggingConfiguration) -> Result<()> {
    let mut state = DEFAULT.lock();
    if state.locked {
        return Err(LoggerError::config(
            "default logging configuration",
            "it has already been read and can no longer be changed",
        ));
    }
    state.configuration = Some(configuration);
    Ok(())
}

/// Whether the default can still be replaced
pub fn is_configuration_locked() -> bool {
    DEFAULT.lock().locked
}

/// The process-wide default configuration
///
/// Reading it fixes it.
pub fn configuration() -> LoggingConfiguration {
    let mut state = DEFAULT.lock();
    state.locked = true;
    state
        .configuration
        .get_or_insert_with(|| LoggingConfiguration::new(ConfigSection::empty()))
        .clone()
}

/// Cached logger from the default configuration
pub fn get_cached(name: &str) -> Result<Arc<ReloadingLogger>> {
    configuration().resolve(name)
}

/// Uncached logger from the default configuration
pub fn create(name: &str) -> Result<Arc<ReloadingLogger>> {
    configuration().create_logger(name)
}

/// Cached logger named [`DEFAULT_LOGGER_NAME`]
pub fn default_logger() -> Result<Arc<ReloadingLogger>> {
    get_cached(DEFAULT_LOGGER_NAME)
}
