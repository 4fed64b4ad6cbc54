//! Fixed properties added to every entry
//!
//! `StaticContextProvider` stores properties that persist across all log
//! entries, such as service name, version or environment. Clones share the
//! same property set, so a host can keep a handle and adjust it while the
//! logger that owns the provider keeps running.

use crate::core::{ContextProvider, ExtendedProperties, LogEntry, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// Thread-safe, shareable set of properties contributed to every entry
///
/// # Example
///
/// ```
/// use rust_logger_core::context::StaticContextProvider;
///
/// let ctx = StaticContextProvider::new()
///     .with("service", "api-gateway")
///     .with("version", "1.2.3");
///
/// ctx.set("region", "eu-west-1");
/// assert_eq!(ctx.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct StaticContextProvider {
    name: String,
    properties: Arc<RwLock<ExtendedProperties>>,
}

impl StaticContextProvider {
    pub fn new() -> Self {
        Self::from_properties(ExtendedProperties::new())
    }

    pub fn from_properties(properties: ExtendedProperties) -> Self {
        Self {
            name: "static".to_string(),
            properties: Arc::new(RwLock::new(properties)),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a property (builder form)
    #[must_use]
    pub fn with<K, V>(self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.set(key, value);
        self
    }

    /// Set a property, overwriting any existing value
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.properties.write().insert(key, value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.properties.write().remove(key)
    }

    pub fn clear(&self) {
        *self.properties.write() = ExtendedProperties::new();
    }

    /// Copy of the current properties
    pub fn snapshot(&self) -> ExtendedProperties {
        self.properties.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    /// Set a property for the lifetime of the returned guard
    ///
    /// When the guard drops, the previous value (if any) is restored.
    ///
    /// ```
    /// use rust_logger_core::context::StaticContextProvider;
    ///
    /// let ctx = StaticContextProvider::new();
    /// {
    ///     let _guard = ctx.scoped("request_id", "abc-123");
    ///     assert!(ctx.snapshot().contains_key("request_id"));
    /// }
    /// assert!(ctx.is_empty());
    /// ```
    #[must_use = "the property is removed as soon as the guard is dropped"]
    pub fn scoped<K, V>(&self, key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        let previous = {
            let mut properties = self.properties.write();
            let previous = properties.remove(&key);
            properties.insert(key.clone(), value);
            previous
        };
        ContextGuard {
            properties: Arc::clone(&self.properties),
            key,
            previous,
        }
    }
}

impl Default for StaticContextProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextProvider for StaticContextProvider {
    fn contribute(&self, _entry: &LogEntry) -> Result<ExtendedProperties> {
        Ok(self.snapshot())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// RAII guard for a scoped property
///
/// Restores the property's previous state on drop.
pub struct ContextGuard {
    properties: Arc<RwLock<ExtendedProperties>>,
    key: String,
    previous: Option<Value>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let mut properties = self.properties.write();
        match self.previous.take() {
            Some(previous) => properties.insert(self.key.clone(), previous),
            None => {
                properties.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use serde_json::json;

    #[test]
    fn test_contributes_snapshot() {
        let ctx = StaticContextProvider::new().with("app", "billing");
        let props = ctx
            .contribute(&LogEntry::new(LogLevel::Info, "x"))
            .unwrap();
        assert_eq!(props.get("app"), Some(&json!("billing")));
    }

    #[test]
    fn test_clones_share_properties() {
        let ctx = StaticContextProvider::new();
        let handle = ctx.clone();
        handle.set("env", "prod");
        assert_eq!(ctx.snapshot().get("env"), Some(&json!("prod")));

        handle.remove("env");
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_guard_restores_previous_value() {
        let ctx = StaticContextProvider::new().with("user", "alice");
        {
            let _guard = ctx.scoped("user", "bob");
            assert_eq!(ctx.snapshot().get("user"), Some(&json!("bob")));
        }
        assert_eq!(ctx.snapshot().get("user"), Some(&json!("alice")));
    }

    #[test]
    fn test_guard_removes_new_key() {
        let ctx = StaticContextProvider::new();
        let guard = ctx.scoped("request_id", 7);
        assert_eq!(ctx.len(), 1);
        drop(guard);
        assert!(ctx.is_empty());
    }
}
