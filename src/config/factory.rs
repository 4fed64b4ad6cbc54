//! Building loggers from configuration
//!
//! [`ProviderRegistry`] is a closed table of provider kinds. A logger
//! definition names the kinds it wants, and the registry turns each one into
//! a provider by calling the factory registered under that name. Hosts add
//! their own kinds with [`ProviderRegistry::register_provider`] and
//! [`ProviderRegistry::register_context_provider`].

use super::section::ConfigSection;
use crate::context::{StaticContextProvider, ThreadContextProvider};
use crate::core::{
    ContextProvider, ErrorCallback, ExtendedProperties, LogProvider, Logger, LoggerError,
    LoggerSettings, PropertySanitizer, Result, DEFAULT_LOGGER_NAME,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a log provider from its settings subtree
pub type LogProviderFactory =
    Arc<dyn Fn(&ConfigSection) -> Result<Arc<dyn LogProvider>> + Send + Sync>;

/// Builds a context provider from its settings subtree
pub type ContextProviderFactory =
    Arc<dyn Fn(&ConfigSection) -> Result<Arc<dyn ContextProvider>> + Send + Sync>;

/// Type tag a wrapped logger definition must carry
pub const LOGGER_TYPE: &str = "Logger";

/// Name a logger definition declares
///
/// For a `{ "type": ..., "value": { ... } }` wrapper with a non-empty value,
/// the name is read from the value; otherwise from the section itself. A
/// definition without a name is called [`DEFAULT_LOGGER_NAME`].
pub fn definition_name(section: &ConfigSection) -> String {
    definition_body(section)
        .child("name")
        .value_str()
        .unwrap_or_else(|| DEFAULT_LOGGER_NAME.to_string())
}

fn is_wrapped(section: &ConfigSection) -> bool {
    section.get("type").is_some() && !section.child("value").is_empty()
}

fn definition_body(section: &ConfigSection) -> ConfigSection {
    if is_wrapped(section) {
        section.child("value")
    } else {
        section.clone()
    }
}

/// Settings for the `static` context provider kind
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StaticContextSettings {
    name: Option<String>,
    properties: ExtendedProperties,
}

/// Name-keyed factories for log and context providers
///
/// Kind names are matched case-insensitively.
///
/// # Example
///
/// ```
/// use rust_logger_core::prelude::*;
/// use serde_json::json;
///
/// let memory = MemoryLogProvider::new();
/// let handle = memory.clone();
///
/// let mut registry = ProviderRegistry::with_builtins();
/// registry.register_provider("memory", move |_| Ok(handle.clone()));
///
/// let definition = ConfigSection::root(json!({
///     "name": "audit",
///     "level": "Info",
///     "providers": ["memory"],
///     "contextProviders": { "type": "static", "value": { "properties": { "app": "billing" } } }
/// }));
/// let logger = registry.build_logger(&definition, None).unwrap();
/// assert_eq!(logger.name(), "audit");
/// assert_eq!(logger.providers().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    log_providers: HashMap<String, LogProviderFactory>,
    context_providers: HashMap<String, ContextProviderFactory>,
    sanitizer: Option<Arc<dyn PropertySanitizer>>,
}

impl ProviderRegistry {
    /// An empty registry with no known kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the kinds this crate ships
    ///
    /// Log providers: `console` and `file` (when their features are enabled).
    /// Context providers: `static` and `thread`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "console")]
        registry.register_provider("console", crate::providers::ConsoleLogProvider::from_section);
        #[cfg(feature = "file")]
        registry.register_provider("file", crate::providers::FileLogProvider::from_section);

        registry.register_context_provider("static", |section: &ConfigSection| {
            let settings: StaticContextSettings = section.bind()?;
            let provider = StaticContextProvider::from_properties(settings.properties);
            Ok(match settings.name {
                Some(name) => provider.with_name(name),
                None => provider,
            })
        });
        registry.register_context_provider("thread", |_: &ConfigSection| Ok(ThreadContextProvider::new()));

        registry
    }

    /// Register (or replace) a log provider kind
    pub fn register_provider<P, F>(&mut self, kind: impl AsRef<str>, factory: F) -> &mut Self
    where
        P: LogProvider + 'static,
        F: Fn(&ConfigSection) -> Result<P> + Send + Sync + 'static,
    {
        let factory: LogProviderFactory = Arc::new(move |section: &ConfigSection| {
            factory(section).map(|provider| Arc::new(provider) as Arc<dyn LogProvider>)
        });
        self.log_providers.insert(kind.as_ref().to_lowercase(), factory);
        self
    }

    /// Register a log provider kind that hands out shared instances
    pub fn register_shared_provider(&mut self, kind: impl AsRef<str>, factory: LogProviderFactory) -> &mut Self {
        self.log_providers.insert(kind.as_ref().to_lowercase(), factory);
        self
    }

    /// Register (or replace) a context provider kind
    pub fn register_context_provider<C, F>(&mut self, kind: impl AsRef<str>, factory: F) -> &mut Self
    where
        C: ContextProvider + 'static,
        F: Fn(&ConfigSection) -> Result<C> + Send + Sync + 'static,
    {
        let factory: ContextProviderFactory = Arc::new(move |section: &ConfigSection| {
            factory(section).map(|provider| Arc::new(provider) as Arc<dyn ContextProvider>)
        });
        self.context_providers.insert(kind.as_ref().to_lowercase(), factory);
        self
    }

    /// Sanitizer installed on every logger this registry builds
    pub fn set_sanitizer<S: PropertySanitizer + 'static>(&mut self, sanitizer: S) -> &mut Self {
        self.sanitizer = Some(Arc::new(sanitizer));
        self
    }

    pub fn has_provider(&self, kind: &str) -> bool {
        self.log_providers.contains_key(&kind.to_lowercase())
    }

    pub fn has_context_provider(&self, kind: &str) -> bool {
        self.context_providers.contains_key(&kind.to_lowercase())
    }

    /// Build one log provider from a list item
    ///
    /// The item is either a bare kind name or a `{ "type", "value" }` object
    /// whose `value` holds the provider's settings.
    pub fn build_provider(&self, item: &ConfigSection) -> Result<Arc<dyn LogProvider>> {
        let (kind, settings) = split_item(item, "log provider")?;
        let factory = self
            .log_providers
            .get(&kind.to_lowercase())
            .ok_or_else(|| LoggerError::unknown_type("log provider", &kind))?;
        factory(&settings)
    }

    /// Build one context provider from a list item
    pub fn build_context_provider(&self, item: &ConfigSection) -> Result<Arc<dyn ContextProvider>> {
        let (kind, settings) = split_item(item, "context provider")?;
        let factory = self
            .context_providers
            .get(&kind.to_lowercase())
            .ok_or_else(|| LoggerError::unknown_type("context provider", &kind))?;
        factory(&settings)
    }

    /// Build a logger from its definition subtree
    ///
    /// Accepts either the bare definition or one wrapped as
    /// `{ "type": "Logger", "value": { ... } }`.
    pub fn build_logger(&self, definition: &ConfigSection, on_error: Option<ErrorCallback>) -> Result<Logger> {
        if is_wrapped(definition) {
            let type_name = definition.child("type").value_str().unwrap_or_default();
            if !type_name.eq_ignore_ascii_case(LOGGER_TYPE) {
                return Err(LoggerError::unknown_type("logger", type_name));
            }
        }

        let body = definition_body(definition);
        let settings: LoggerSettings = body.bind()?;
        settings.validate()?;

        let mut builder = Logger::builder()
            .name(definition_name(definition))
            .settings(settings)
            .maybe_on_error(on_error);

        for item in body.child("providers").items() {
            builder = builder.shared_provider(self.build_provider(&item)?);
        }
        for item in body.child("contextProviders").items() {
            builder = builder.shared_context_provider(self.build_context_provider(&item)?);
        }
        if let Some(ref sanitizer) = self.sanitizer {
            builder = builder.shared_sanitizer(Arc::clone(sanitizer));
        }

        Ok(builder.build())
    }
}

/// Split a provider item into its kind and settings subtree
fn split_item(item: &ConfigSection, component: &str) -> Result<(String, ConfigSection)> {
    if let Some(kind) = item.value_str() {
        return Ok((kind, ConfigSection::from_value("value", serde_json::Value::Null)));
    }

    let kind = item.child("type").value_str().ok_or_else(|| {
        LoggerError::config(
            format!("{} at '{}'", component, item.path()),
            "expected a kind name or an object with a 'type' member",
        )
    })?;
    Ok((kind, item.child("value")))
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut log_kinds: Vec<_> = self.log_providers.keys().collect();
        log_kinds.sort();
        let mut context_kinds: Vec<_> = self.context_providers.keys().collect();
        context_kinds.sort();

        f.debug_struct("ProviderRegistry")
            .field("log_providers", &log_kinds)
            .field("context_providers", &context_kinds)
            .field("sanitizer", &self.sanitizer.is_some())
            .finish()
    }
}
