//! Stable logger handle that follows configuration changes

use super::factory::ProviderRegistry;
use super::registry::find_definition;
use super::section::ConfigSection;
use crate::core::{
    CallerInfo, DispatchMode, ErrorReporter, LogDispatch, LogEntry, LogLevel, Logger, LoggerError,
    Result,
};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Proxy whose target [`Logger`] is replaced when its definition changes
///
/// Every operation reads the current target once and runs entirely against
/// it, so a dispatch that started before a reload finishes on the old logger
/// while later calls see the new one.
pub struct ReloadingLogger {
    requested_name: String,
    target: ArcSwap<Logger>,
    definition: Mutex<ConfigSection>,
    reloads: AtomicU64,
}

impl ReloadingLogger {
    pub(crate) fn new(requested_name: &str, logger: Logger, definition: ConfigSection) -> Self {
        Self {
            requested_name: requested_name.to_string(),
            target: ArcSwap::from_pointee(logger),
            definition: Mutex::new(definition),
            reloads: AtomicU64::new(0),
        }
    }

    /// Name this handle was resolved with
    pub fn requested_name(&self) -> &str {
        &self.requested_name
    }

    /// The logger calls are currently forwarded to
    pub fn current(&self) -> Arc<Logger> {
        self.target.load_full()
    }

    /// Definition subtree the current target was built from
    pub fn definition(&self) -> ConfigSection {
        self.definition.lock().clone()
    }

    /// Number of times the target has been replaced
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Rebuild the target from `section` if this logger's definition changed
    ///
    /// On failure the current target stays in place and the error is
    /// reported.
    pub(crate) fn apply(&self, section: &ConfigSection, registry: &ProviderRegistry, reporter: &ErrorReporter) {
        let Some(definition) = find_definition(section, &self.requested_name) else {
            let error = LoggerError::reload(
                &self.requested_name,
                LoggerError::logger_not_found(&self.requested_name).to_string(),
            );
            reporter.report_error(&self.requested_name, &error);
            return;
        };

        if self.definition.lock().raw() == definition.raw() {
            return;
        }

        match registry.build_logger(&definition, reporter.callback().cloned()) {
            Ok(logger) => {
                self.target.store(Arc::new(logger));
                *self.definition.lock() = definition;
                self.reloads.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                let error = LoggerError::reload(&self.requested_name, e.to_string());
                reporter.report_error(&self.requested_name, &error);
            }
        }
    }
}

#[async_trait]
impl LogDispatch for ReloadingLogger {
    fn name(&self) -> &str {
        // Stable across reloads
        &self.requested_name
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        self.target.load().is_enabled(level)
    }

    async fn log(
        &self,
        entry: LogEntry,
        mode: Option<DispatchMode>,
        caller: Option<CallerInfo>,
    ) -> Result<()> {
        let target = self.current();
        target.log(entry, mode, caller).await
    }

    fn log_detached(&self, entry: LogEntry, caller: Option<CallerInfo>) {
        self.target.load().log_detached(entry, caller)
    }

    async fn flush(&self) -> Result<()> {
        let target = self.current();
        target.flush().await
    }
}

impl fmt::Debug for ReloadingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadingLogger")
            .field("requested_name", &self.requested_name)
            .field("target", &*self.target.load())
            .field("reloads", &self.reload_count())
            .finish()
    }
}
