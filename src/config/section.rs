//! Hierarchical configuration tree
//!
//! A [`ConfigSection`] is a node of a JSON document seen the way layered
//! configuration systems see it: every node has a key, a `:`-separated path
//! from the root, an optional scalar value, and ordered children. Object
//! members and array elements are both children; array elements are keyed by
//! their index.

use crate::core::{LoggerError, Result};
use serde::de::{DeserializeOwned, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::Value;

/// Path separator between nested keys
pub const KEY_DELIMITER: &str = ":";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSection {
    key: String,
    path: String,
    value: Value,
}

impl ConfigSection {
    /// Root of a tree
    pub fn root(value: Value) -> Self {
        Self {
            key: String::new(),
            path: String::new(),
            value,
        }
    }

    /// Standalone section with the given key
    pub fn from_value(key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        Self {
            path: key.clone(),
            key,
            value,
        }
    }

    /// Parse JSON text into a root section
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(Self::root(serde_json::from_str(text)?))
    }

    /// An empty root
    pub fn empty() -> Self {
        Self::root(Value::Null)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying JSON node
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Scalar value rendered as text
    ///
    /// `None` for objects, arrays and null.
    pub fn value_str(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn has_value(&self) -> bool {
        self.value_str().is_some()
    }

    /// Ordered children: object members or array elements
    pub fn children(&self) -> Vec<ConfigSection> {
        match &self.value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| self.make_child(key, value.clone()))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, value)| self.make_child(&index.to_string(), value.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Value of a direct child, matched case-insensitively
    pub fn get(&self, key: &str) -> Option<&Value> {
        match &self.value {
            Value::Object(map) => map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Direct child, matched case-insensitively
    ///
    /// A missing child comes back as an empty section rather than `None`.
    pub fn child(&self, key: &str) -> ConfigSection {
        let value = self.get(key).cloned().unwrap_or(Value::Null);
        self.make_child(key, value)
    }

    /// Descendant at a `:`-separated path
    pub fn section(&self, path: &str) -> ConfigSection {
        path.split(KEY_DELIMITER)
            .filter(|segment| !segment.is_empty())
            .fold(self.clone(), |section, segment| section.child(segment))
    }

    /// True when the node has neither a scalar value nor children
    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// True when the node has at least one child, every child key equals its
    /// zero-based position, and there is no scalar value
    pub fn is_list(&self) -> bool {
        match &self.value {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => {
                !map.is_empty()
                    && map
                        .keys()
                        .enumerate()
                        .all(|(index, key)| *key == index.to_string())
            }
            _ => false,
        }
    }

    /// Children when this is a list, otherwise this section alone
    ///
    /// Empty sections yield nothing.
    pub fn items(&self) -> Vec<ConfigSection> {
        if self.is_list() {
            self.children()
        } else if self.is_empty() {
            Vec::new()
        } else {
            vec![self.clone()]
        }
    }

    /// Deserialize this section into `T`
    ///
    /// An empty section binds like an empty object, so types whose fields all
    /// have defaults bind successfully. Member names of this section match
    /// the fields of `T` case-insensitively, like [`get`](Self::get); nested
    /// values bind as written.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T> {
        let value = match &self.value {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        T::deserialize(CaseInsensitive(value))
            .map_err(|e| LoggerError::config(self.display_path(), e.to_string()))
    }

    fn display_path(&self) -> String {
        if self.path.is_empty() {
            "configuration root".to_string()
        } else {
            format!("section '{}'", self.path)
        }
    }

    fn make_child(&self, key: &str, value: Value) -> ConfigSection {
        let path = if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.path, KEY_DELIMITER, key)
        };
        ConfigSection {
            key: key.to_string(),
            path,
            value,
        }
    }
}

/// Deserializer that renames object members to the struct field they match
/// ignoring case, then defers to `serde_json`
struct CaseInsensitive(Value);

macro_rules! forward_to_value {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, Self::Error> {
                self.0.$method(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for CaseInsensitive {
    type Error = serde_json::Error;

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        let value = match self.0 {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| {
                        let key = fields
                            .iter()
                            .find(|field| field.eq_ignore_ascii_case(&key))
                            .map_or(key, |field| field.to_string());
                        (key, value)
                    })
                    .collect(),
            ),
            other => other,
        };
        value.deserialize_struct(name, fields, visitor)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_tuple(len, visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_tuple_struct(name, len, visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    forward_to_value! {
        deserialize_any deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_option deserialize_unit deserialize_seq deserialize_map
        deserialize_identifier deserialize_ignored_any
    }
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for ConfigSection {
    fn from(value: Value) -> Self {
        Self::root(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_children_and_paths() {
        let root = ConfigSection::root(json!({ "logging": { "providers": ["console", "file"] } }));
        let providers = root.section("logging:providers");

        assert_eq!(providers.path(), "logging:providers");
        let children = providers.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].key(), "1");
        assert_eq!(children[1].path(), "logging:providers:1");
        assert_eq!(children[1].value_str().as_deref(), Some("file"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let section = ConfigSection::root(json!({ "Name": "A", "Level": "warn" }));
        assert_eq!(section.child("name").value_str().as_deref(), Some("A"));
        assert_eq!(section.get("LEVEL"), Some(&json!("warn")));
        assert!(section.child("missing").is_empty());
    }

    #[test]
    fn test_is_list() {
        assert!(ConfigSection::root(json!([{ "name": "a" }])).is_list());
        assert!(ConfigSection::root(json!({ "0": "a", "1": "b" })).is_list());
        assert!(!ConfigSection::root(json!({ "1": "a", "0": "b" })).is_list());
        assert!(!ConfigSection::root(json!({ "name": "a" })).is_list());
        assert!(!ConfigSection::root(json!([])).is_list());
        assert!(!ConfigSection::root(json!("scalar")).is_list());
    }

    #[test]
    fn test_items() {
        assert_eq!(ConfigSection::root(json!(["a", "b"])).items().len(), 2);
        assert_eq!(ConfigSection::root(json!({ "type": "console" })).items().len(), 1);
        assert!(ConfigSection::empty().items().is_empty());
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(default, rename_all = "camelCase")]
    struct Sample {
        concurrency_level: usize,
        name: Option<String>,
    }

    #[test]
    fn test_bind() {
        let sample: Sample = ConfigSection::root(json!({ "concurrencyLevel": 3 })).bind().unwrap();
        assert_eq!(sample.concurrency_level, 3);
        assert!(sample.name.is_none());

        let empty: Sample = ConfigSection::empty().bind().unwrap();
        assert_eq!(empty.concurrency_level, 0);
    }

    #[test]
    fn test_bind_ignores_member_case() {
        let sample: Sample = ConfigSection::root(json!({ "ConcurrencyLevel": 5, "NAME": "a" }))
            .bind()
            .unwrap();
        assert_eq!(sample.concurrency_level, 5);
        assert_eq!(sample.name.as_deref(), Some("a"));
    }

    #[derive(Debug, Deserialize)]
    struct WithMap {
        properties: serde_json::Map<String, Value>,
    }

    #[test]
    fn test_bind_keeps_nested_keys() {
        let bound: WithMap = ConfigSection::root(json!({ "Properties": { "RequestId": 1 } }))
            .bind()
            .unwrap();
        assert!(bound.properties.contains_key("RequestId"));
    }

    #[test]
    fn test_bind_error_names_section() {
        let root = ConfigSection::root(json!({ "logging": { "concurrencyLevel": "many" } }));
        let err = root.section("logging").bind::<Sample>().unwrap_err();
        assert!(err.to_string().contains("section 'logging'"));
    }

    #[test]
    fn test_from_json_str() {
        let section = ConfigSection::from_json_str(r#"{ "a": { "b": true } }"#).unwrap();
        assert_eq!(section.section("a:b").value_str().as_deref(), Some("true"));
        assert!(ConfigSection::from_json_str("{ not json").is_err());
    }
}
