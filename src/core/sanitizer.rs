//! Extended-property sanitization
//!
//! The logger applies a [`PropertySanitizer`] to every extended property after
//! enrichment and before any provider sees the entry.

use serde_json::Value;
use std::collections::HashSet;

pub trait PropertySanitizer: Send + Sync {
    fn sanitize(&self, key: &str, value: Value) -> Value;
}

impl<F> PropertySanitizer for F
where
    F: Fn(&str, Value) -> Value + Send + Sync,
{
    fn sanitize(&self, key: &str, value: Value) -> Value {
        self(key, value)
    }
}

/// Replaces the values of named properties with a fixed placeholder.
///
/// Key matching is case-insensitive and also applies to object members
/// nested inside property values.
#[derive(Debug, Clone)]
pub struct RedactKeys {
    keys: HashSet<String>,
    replacement: String,
}

impl RedactKeys {
    pub const DEFAULT_REPLACEMENT: &'static str = "[REDACTED]";

    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            replacement: Self::DEFAULT_REPLACEMENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    fn is_sensitive(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    fn scrub(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let v = if self.is_sensitive(&k) {
                            Value::String(self.replacement.clone())
                        } else {
                            self.scrub(v)
                        };
                        (k, v)
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.scrub(v)).collect()),
            other => other,
        }
    }
}

impl PropertySanitizer for RedactKeys {
    fn sanitize(&self, key: &str, value: Value) -> Value {
        if self.is_sensitive(key) {
            Value::String(self.replacement.clone())
        } else {
            self.scrub(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_top_level_key() {
        let redact = RedactKeys::new(["password"]);
        assert_eq!(redact.sanitize("Password", json!("hunter2")), json!("[REDACTED]"));
        assert_eq!(redact.sanitize("user", json!("bob")), json!("bob"));
    }

    #[test]
    fn test_redacts_nested_members() {
        let redact = RedactKeys::new(["ssn"]).with_replacement("***");
        let value = json!({ "name": "bob", "ssn": "123", "items": [{ "SSN": "456" }] });
        assert_eq!(
            redact.sanitize("customer", value),
            json!({ "name": "bob", "ssn": "***", "items": [{ "SSN": "***" }] })
        );
    }

    #[test]
    fn test_closure_sanitizer() {
        let upper = |_: &str, v: Value| match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        };
        assert_eq!(upper.sanitize("k", json!("abc")), json!("ABC"));
    }
}
