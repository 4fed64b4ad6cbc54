//! Configuration-driven logger registry
//!
//! A [`LoggingConfiguration`] wraps a configuration tree and hands out
//! [`ReloadingLogger`] handles resolved by name. Handles resolved through
//! [`LoggingConfiguration::resolve`] are cached for the lifetime of the
//! configuration; every live handle is rebuilt when
//! [`LoggingConfiguration::update`] installs a tree that changes its
//! definition.

use super::factory::{definition_name, ProviderRegistry};
use super::reloading::ReloadingLogger;
use super::section::ConfigSection;
use crate::core::{ErrorCallback, ErrorReporter, LoggerError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use std::fmt;
use std::sync::{Arc, Weak};

/// Conventional key of the logging subtree in an application's configuration
pub const SECTION_NAME: &str = "logging";

/// Find the definition of logger `name` in a logging section
///
/// A list section is searched for a child whose declared name matches; any
/// other section is a single definition that matches only its own name.
/// Names compare case-insensitively. An empty section is a single unnamed
/// definition, so it matches the default name.
pub fn find_definition(section: &ConfigSection, name: &str) -> Option<ConfigSection> {
    if section.is_list() {
        section
            .children()
            .into_iter()
            .find(|child| definition_name(child).eq_ignore_ascii_case(name))
    } else if definition_name(section).eq_ignore_ascii_case(name) {
        Some(section.clone())
    } else {
        None
    }
}

/// Handle to a logging configuration tree and its logger cache
///
/// Cloning is cheap and clones share the cache.
///
/// # Example
///
/// ```
/// use rust_logger_core::prelude::*;
/// use serde_json::json;
///
/// let config = LoggingConfiguration::new(ConfigSection::root(json!([
///     { "name": "orders", "level": "Info" },
///     { "name": "audit", "level": "Audit" }
/// ])));
///
/// let orders = config.resolve("orders").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&orders, &config.resolve("orders").unwrap()));
/// assert!(orders.is_enabled(LogLevel::Warn));
///
/// config.update(ConfigSection::root(json!([{ "name": "orders", "level": "Error" }])));
/// assert!(!orders.is_enabled(LogLevel::Warn));
/// ```
#[derive(Clone)]
pub struct LoggingConfiguration {
    inner: Arc<Inner>,
}

struct Inner {
    section: RwLock<Arc<ConfigSection>>,
    registry: ProviderRegistry,
    reporter: ErrorReporter,
    cache: DashMap<String, Arc<ReloadingLogger>>,
    watchers: Mutex<Vec<Weak<ReloadingLogger>>>,
}

impl LoggingConfiguration {
    /// Configuration using the built-in provider kinds
    pub fn new(section: ConfigSection) -> Self {
        Self::builder(section).build()
    }

    pub fn builder(section: ConfigSection) -> LoggingConfigurationBuilder {
        LoggingConfigurationBuilder::new(section)
    }

    /// Configuration over the [`SECTION_NAME`] subtree of an application root
    pub fn from_root(root: &ConfigSection) -> Self {
        Self::new(root.section(SECTION_NAME))
    }

    /// Parse a logging section from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(Self::new(ConfigSection::from_json_str(text)?))
    }

    /// The current tree
    pub fn section(&self) -> Arc<ConfigSection> {
        Arc::clone(&*self.inner.section.read())
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    /// Cached handle for `name`, constructing it on first use
    ///
    /// Concurrent callers asking for the same name get the same handle and
    /// the logger is built once. Names are cached exactly as given, while
    /// definitions are matched case-insensitively. A failed construction is
    /// not cached.
    ///
    /// Provider factories run while the cache entry is locked and must not
    /// resolve loggers from the same configuration.
    ///
    /// # Errors
    ///
    /// [`LoggerError::LoggerNotFound`] when no definition matches `name`, or
    /// the construction error from the provider registry.
    pub fn resolve(&self, name: &str) -> Result<Arc<ReloadingLogger>> {
        if let Some(existing) = self.inner.cache.get(name) {
            return Ok(Arc::clone(existing.value()));
        }

        match self.inner.cache.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let logger = self.construct(name)?;
                entry.insert(Arc::clone(&logger));
                Ok(logger)
            }
        }
    }

    /// New handle for `name`, bypassing the cache
    ///
    /// The handle still follows configuration updates while it is alive.
    pub fn create_logger(&self, name: &str) -> Result<Arc<ReloadingLogger>> {
        self.construct(name)
    }

    /// Install a new tree and rebuild every live handle whose definition
    /// changed
    ///
    /// Updates are applied one at a time. A handle whose rebuild fails keeps
    /// its previous logger and the failure is reported.
    pub fn update(&self, section: ConfigSection) {
        let mut current = self.inner.section.write();
        *current = Arc::new(section);
        // Resolvers may proceed against the new tree; other updates still wait
        let current = RwLockWriteGuard::downgrade(current);

        for proxy in self.live_watchers() {
            proxy.apply(&current, &self.inner.registry, &self.inner.reporter);
        }
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.cache.contains_key(name)
    }

    /// Names in the cache, sorted
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.cache.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of handles that would be notified by an update
    pub fn live_handles(&self) -> usize {
        self.live_watchers().len()
    }

    /// Whether two values share the same tree and cache
    pub fn ptr_eq(&self, other: &LoggingConfiguration) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn construct(&self, name: &str) -> Result<Arc<ReloadingLogger>> {
        // Held until the handle is registered so no update slips in between
        let section = self.inner.section.read();
        let definition = find_definition(&section, name).ok_or_else(|| LoggerError::logger_not_found(name))?;
        let logger = self
            .inner
            .registry
            .build_logger(&definition, self.inner.reporter.callback().cloned())?;

        let proxy = Arc::new(ReloadingLogger::new(name, logger, definition));
        self.inner.watchers.lock().push(Arc::downgrade(&proxy));
        Ok(proxy)
    }

    fn live_watchers(&self) -> Vec<Arc<ReloadingLogger>> {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| w.strong_count() > 0);
        watchers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl fmt::Debug for LoggingConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfiguration")
            .field("section", &self.inner.section.read().path())
            .field("registry", &self.inner.registry)
            .field("cached", &self.cached_names())
            .finish()
    }
}

/// Builder for [`LoggingConfiguration`]
pub struct LoggingConfigurationBuilder {
    section: ConfigSection,
    registry: Option<ProviderRegistry>,
    on_error: Option<ErrorCallback>,
}

impl LoggingConfigurationBuilder {
    pub fn new(section: ConfigSection) -> Self {
        Self {
            section,
            registry: None,
            on_error: None,
        }
    }

    /// Provider kinds to build from; defaults to [`ProviderRegistry::with_builtins`]
    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Callback for reload failures and for every logger built from this
    /// configuration
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    pub fn build(self) -> LoggingConfiguration {
        LoggingConfiguration {
            inner: Arc::new(Inner {
                section: RwLock::new(Arc::new(self.section)),
                registry: self.registry.unwrap_or_else(ProviderRegistry::with_builtins),
                reporter: ErrorReporter::new(self.on_error),
                cache: DashMap::new(),
                watchers: Mutex::new(Vec::new()),
            }),
        }
    }
}
