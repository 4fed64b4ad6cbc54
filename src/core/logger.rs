//! Main logger implementation

use super::{
    configuration::{LoggerConfiguration, LoggerSettings},
    context_provider::ContextProvider,
    dispatch::{DispatchMode, LogDispatch},
    error::{panic_message, LoggerError, ProviderFailure, Result},
    error_handler::{ErrorCallback, ErrorReport, ErrorReporter},
    log_entry::{CallerInfo, LogEntry},
    log_level::LogLevel,
    log_provider::LogProvider,
    metrics::LoggerMetrics,
    sanitizer::PropertySanitizer,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinSet;

/// Name given to loggers that do not declare one
pub const DEFAULT_LOGGER_NAME: &str = "default";

/// Default time `shutdown` callers are expected to allow for draining
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Level-gating, enriching, fan-out dispatch engine
///
/// A logger owns an ordered set of [`LogProvider`]s and [`ContextProvider`]s
/// fixed at construction, plus a [`LoggerConfiguration`] that is re-read on
/// every call.
///
/// # Example
///
/// ```
/// use rust_logger_core::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<()> {
/// let memory = MemoryLogProvider::new();
/// let logger = Logger::builder()
///     .name("orders")
///     .min_level(LogLevel::Info)
///     .provider(memory.clone())
///     .build();
///
/// if logger.is_enabled(LogLevel::Info) {
///     let entry = LogEntry::new(LogLevel::Info, "order placed").with_property("id", 42);
///     logger.log(entry, Some(DispatchMode::Blocking), None).await?;
/// }
/// assert_eq!(memory.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Logger {
    shared: Arc<Shared>,
    configuration: Arc<dyn LoggerConfiguration>,
    runtime: Option<Handle>,
}

/// State shared with detached dispatch tasks
struct Shared {
    name: String,
    providers: Vec<Arc<dyn LogProvider>>,
    context_providers: Vec<Arc<dyn ContextProvider>>,
    sanitizer: Option<Arc<dyn PropertySanitizer>>,
    reporter: ErrorReporter,
    metrics: LoggerMetrics,
    stopped: AtomicBool,
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Outcome of gating and enrichment
enum Prepared {
    Filtered,
    Stopped,
    Ready(Arc<LogEntry>),
}

/// Counts a dispatch as in flight until dropped
struct InFlight(Arc<Shared>);

impl InFlight {
    fn enter(shared: &Arc<Shared>) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight(Arc::clone(shared))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl Logger {
    /// Logger named [`DEFAULT_LOGGER_NAME`] with default settings and no providers
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_logger_core::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .name("payments")
    ///     .min_level(LogLevel::Warn)
    ///     .concurrency_level(2)
    ///     .build();
    /// assert_eq!(logger.name(), "payments");
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn providers(&self) -> &[Arc<dyn LogProvider>] {
        &self.shared.providers
    }

    pub fn context_providers(&self) -> &[Arc<dyn ContextProvider>] {
        &self.shared.context_providers
    }

    pub fn configuration(&self) -> &Arc<dyn LoggerConfiguration> {
        &self.configuration
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Number of dispatches currently running
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    /// Whether an entry at `level` would be dispatched
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.configuration.is_enabled(level)
    }

    /// Enrich `entry` and dispatch it to every provider
    ///
    /// Disabled levels are a no-op. With [`DispatchMode::Blocking`] the call
    /// returns once every provider write has finished and fails with
    /// [`LoggerError::DispatchFailed`] if any of them failed. With
    /// [`DispatchMode::Detached`] it returns as soon as enrichment is done.
    /// `None` uses the configuration's default.
    pub async fn log(
        &self,
        entry: LogEntry,
        mode: Option<DispatchMode>,
        caller: Option<CallerInfo>,
    ) -> Result<()> {
        let mode = mode.unwrap_or_else(|| {
            DispatchMode::from_block_until_complete(self.configuration.block_until_complete())
        });

        let entry = match self.prepare(entry, caller) {
            Prepared::Filtered => return Ok(()),
            Prepared::Stopped => {
                return match mode {
                    DispatchMode::Blocking => Err(LoggerError::LoggerStopped),
                    DispatchMode::Detached => Ok(()),
                }
            }
            Prepared::Ready(entry) => entry,
        };

        match mode {
            DispatchMode::Detached => {
                self.spawn_detached(entry);
                Ok(())
            }
            DispatchMode::Blocking => {
                let Some(runtime) = self.runtime_handle() else {
                    self.shared.metrics.record_dropped();
                    self.shared.report(&LoggerError::NoRuntime, &entry);
                    return Err(LoggerError::NoRuntime);
                };
                let Some(in_flight) = self.enter_unless_stopped() else {
                    return Err(LoggerError::LoggerStopped);
                };

                // The fan-out owns its writes, so dropping this future does
                // not cancel providers that were already started or queued
                let shared = Arc::clone(&self.shared);
                let concurrency = self.configuration.concurrency_level();
                let task_runtime = runtime.clone();
                let fan_out = runtime.spawn(async move {
                    let _in_flight = in_flight;
                    shared.dispatch(entry, concurrency, task_runtime).await
                });
                let failures = fan_out
                    .await
                    .map_err(|e| LoggerError::other(format!("dispatch task failed: {}", e)))?;
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(LoggerError::DispatchFailed { failures })
                }
            }
        }
    }

    /// Enrich `entry` and dispatch it in the background
    ///
    /// Usable from synchronous code, including `Drop` implementations.
    pub fn log_detached(&self, entry: LogEntry, caller: Option<CallerInfo>) {
        if let Prepared::Ready(entry) = self.prepare(entry, caller) {
            self.spawn_detached(entry);
        }
    }

    /// Flush every provider, returning the first error
    ///
    /// Every provider is flushed even when an earlier one fails.
    pub async fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for provider in &self.shared.providers {
            if let Err(e) = provider.flush().await {
                let error = LoggerError::provider_write(provider.name(), format!("flush failed: {}", e));
                self.shared.reporter.report_error(&self.shared.name, &error);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop accepting dispatches, drain in-flight ones and flush providers
    ///
    /// After this call blocking log calls fail with
    /// [`LoggerError::LoggerStopped`] and detached ones are ignored.
    ///
    /// # Returns
    ///
    /// `true` if every in-flight dispatch finished within `timeout` and the
    /// final flush succeeded
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.shared.stopped.store(true, Ordering::SeqCst);

        let drained = tokio::time::timeout(timeout, self.wait_idle()).await.is_ok();
        if !drained {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' still had {} dispatch(es) in flight after {:?}. \
                 Some entries may be lost.",
                self.shared.name,
                self.in_flight(),
                timeout
            );
        }

        if let Err(e) = self.flush().await {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }

        drained
    }

    /// Wait until no dispatch is in flight
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.shared.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Count a dispatch as in flight, unless `shutdown` has begun
    ///
    /// The counter is raised before `stopped` is read, so `shutdown` either
    /// waits for this dispatch or this call sees the flag.
    fn enter_unless_stopped(&self) -> Option<InFlight> {
        let in_flight = InFlight::enter(&self.shared);
        if self.is_stopped() {
            drop(in_flight);
            self.shared.metrics.record_dropped();
            return None;
        }
        Some(in_flight)
    }

    fn runtime_handle(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    fn prepare(&self, mut entry: LogEntry, caller: Option<CallerInfo>) -> Prepared {
        if !self.is_enabled(entry.level) {
            self.shared.metrics.record_filtered();
            return Prepared::Filtered;
        }
        if self.is_stopped() {
            self.shared.metrics.record_dropped();
            return Prepared::Stopped;
        }

        if caller.is_some() {
            entry.caller = caller;
        }
        self.shared.enrich(&mut entry);
        Prepared::Ready(Arc::new(entry))
    }

    fn spawn_detached(&self, entry: Arc<LogEntry>) {
        let Some(runtime) = self.runtime_handle() else {
            self.shared.metrics.record_dropped();
            self.shared.report(&LoggerError::NoRuntime, &entry);
            return;
        };

        let Some(in_flight) = self.enter_unless_stopped() else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        let concurrency = self.configuration.concurrency_level();
        let task_runtime = runtime.clone();
        runtime.spawn(async move {
            let _in_flight = in_flight;
            shared.dispatch(entry, concurrency, task_runtime).await;
        });
    }
}

impl Shared {
    /// Run every context provider against `entry`, isolating failures
    fn enrich(&self, entry: &mut LogEntry) {
        for provider in &self.context_providers {
            let contributed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                provider.contribute(entry)
            }));

            let message = match contributed {
                Ok(Ok(properties)) => {
                    entry.extended_properties.extend(properties);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(&*payload)),
            };

            self.metrics.record_context_failure();
            let error = LoggerError::context_provider(provider.name(), message);
            self.report(&error, entry);
        }

        if let Some(ref sanitizer) = self.sanitizer {
            entry
                .extended_properties
                .transform(|key, value| sanitizer.sanitize(key, value));
        }
    }

    /// Write `entry` to every provider with at most `concurrency` writes in flight
    ///
    /// Each write runs in its own task so an error or panic stays with that
    /// provider. Returns the failures ordered by provider position.
    async fn dispatch(
        self: Arc<Self>,
        entry: Arc<LogEntry>,
        concurrency: usize,
        runtime: Handle,
    ) -> Vec<ProviderFailure> {
        self.metrics.record_dispatched();

        let slots = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut writes = JoinSet::new();
        let mut positions = HashMap::with_capacity(self.providers.len());

        for (index, provider) in self.providers.iter().enumerate() {
            // Waits here while `concurrency` writes are running
            let permit = match Arc::clone(&slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let provider = Arc::clone(provider);
            let entry = Arc::clone(&entry);
            let handle = writes.spawn_on(
                async move {
                    let _permit = permit;
                    provider.write(&entry).await
                },
                &runtime,
            );
            positions.insert(handle.id(), index);
        }

        let mut failures = Vec::new();
        while let Some(joined) = writes.join_next_with_id().await {
            let (id, message, panicked) = match joined {
                Ok((_, Ok(()))) => continue,
                Ok((id, Err(e))) => (id, e.to_string(), false),
                Err(join_error) => {
                    let id = join_error.id();
                    match join_error.try_into_panic() {
                        Ok(payload) => (id, panic_message(&*payload), true),
                        Err(_) => (id, "write task was cancelled".to_string(), false),
                    }
                }
            };

            let index = positions.get(&id).copied().unwrap_or_default();
            let provider = self
                .providers
                .get(index)
                .map(|p| p.name().to_string())
                .unwrap_or_default();
            let failure = ProviderFailure {
                index,
                provider,
                message,
                panicked,
            };

            self.metrics.record_provider_failure();
            self.report(&LoggerError::from(failure.clone()), &entry);
            failures.push(failure);
        }

        failures.sort_by_key(|f| f.index);
        failures
    }

    fn report(&self, error: &LoggerError, entry: &LogEntry) {
        self.reporter.report(&ErrorReport {
            logger: &self.name,
            error,
            level: Some(entry.level),
            caller: entry.caller.as_ref(),
        });
    }
}

#[async_trait]
impl LogDispatch for Logger {
    fn name(&self) -> &str {
        Logger::name(self)
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        Logger::is_enabled(self, level)
    }

    async fn log(
        &self,
        entry: LogEntry,
        mode: Option<DispatchMode>,
        caller: Option<CallerInfo>,
    ) -> Result<()> {
        Logger::log(self, entry, mode, caller).await
    }

    fn log_detached(&self, entry: LogEntry, caller: Option<CallerInfo>) {
        Logger::log_detached(self, entry, caller)
    }

    async fn flush(&self) -> Result<()> {
        Logger::flush(self).await
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.shared.name)
            .field(
                "providers",
                &self.shared.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "context_providers",
                &self
                    .shared
                    .context_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("enabled", &self.configuration.is_logging_enabled())
            .field("level", &self.configuration.logging_level())
            .field("concurrency_level", &self.configuration.concurrency_level())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Detached tasks keep `shared` alive, so only the last owner reports
        if Arc::strong_count(&self.shared) == 1 {
            let dropped = self.shared.metrics.dropped_count();
            if dropped > 0 {
                eprintln!(
                    "[LOGGER WARNING] Logger '{}' dropped with {} undispatched entries (drop rate: {:.2}%)",
                    self.shared.name,
                    dropped,
                    self.shared.metrics.drop_rate()
                );
            }
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_logger_core::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .name("api")
///     .min_level(LogLevel::Debug)
///     .provider(MemoryLogProvider::new())
///     .context_provider(ThreadContextProvider::new())
///     .sanitizer(RedactKeys::new(["password"]))
///     .on_error(Arc::new(|report| {
///         eprintln!("ALERT: {}", report);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    name: String,
    settings: LoggerSettings,
    configuration: Option<Arc<dyn LoggerConfiguration>>,
    providers: Vec<Arc<dyn LogProvider>>,
    context_providers: Vec<Arc<dyn ContextProvider>>,
    sanitizer: Option<Arc<dyn PropertySanitizer>>,
    on_error: Option<ErrorCallback>,
    runtime: Option<Handle>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            name: DEFAULT_LOGGER_NAME.to_string(),
            settings: LoggerSettings::default(),
            configuration: None,
            providers: Vec::new(),
            context_providers: Vec::new(),
            sanitizer: None,
            on_error: None,
            runtime: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.settings.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.settings.is_disabled = !enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn concurrency_level(mut self, concurrency_level: usize) -> Self {
        self.settings.concurrency_level = concurrency_level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn block_until_complete(mut self, block: bool) -> Self {
        self.settings.block_until_complete = block;
        self
    }

    /// Replace all static settings
    #[must_use = "builder methods return a new value"]
    pub fn settings(mut self, settings: LoggerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a shared, possibly live, configuration instead of static settings
    #[must_use = "builder methods return a new value"]
    pub fn configuration(mut self, configuration: Arc<dyn LoggerConfiguration>) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Add a provider
    #[must_use = "builder methods return a new value"]
    pub fn provider<P: LogProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_provider(mut self, provider: Arc<dyn LogProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn context_provider<C: ContextProvider + 'static>(mut self, provider: C) -> Self {
        self.context_providers.push(Arc::new(provider));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context_providers.push(provider);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sanitizer<S: PropertySanitizer + 'static>(mut self, sanitizer: S) -> Self {
        self.sanitizer = Some(Arc::new(sanitizer));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_sanitizer(mut self, sanitizer: Arc<dyn PropertySanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Set a callback for provider, context provider and reload failures
    ///
    /// Without one, failures are printed to stderr.
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn maybe_on_error(mut self, callback: Option<ErrorCallback>) -> Self {
        self.on_error = callback;
        self
    }

    /// Spawn detached dispatches on this runtime instead of the caller's
    #[must_use = "builder methods return a new value"]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let configuration = self
            .configuration
            .unwrap_or_else(|| Arc::new(self.settings));

        Logger {
            shared: Arc::new(Shared {
                name: self.name,
                providers: self.providers,
                context_providers: self.context_providers,
                sanitizer: self.sanitizer,
                reporter: ErrorReporter::new(self.on_error),
                metrics: LoggerMetrics::new(),
                stopped: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
            configuration,
            runtime: self.runtime,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
