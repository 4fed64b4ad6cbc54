//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Insertion-ordered key/value properties attached to an entry.
///
/// Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtendedProperties {
    fields: Map<String, Value>,
}

impl ExtendedProperties {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Add a property (builder form)
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(key, value);
        self
    }

    /// Add or replace a property
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Merge `other` into `self`; keys from `other` win
    pub fn extend(&mut self, other: ExtendedProperties) {
        for (key, value) in other.fields {
            self.fields.insert(key, value);
        }
    }

    /// Replace every value with `f(key, value)`
    pub fn transform<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, Value) -> Value,
    {
        for (key, value) in self.fields.iter_mut() {
            let current = std::mem::take(value);
            *value = f(key, current);
        }
    }

    /// Format properties as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ExtendedProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ExtendedProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = ExtendedProperties::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

impl IntoIterator for ExtendedProperties {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Structured description of an error attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner: Option<Box<ExceptionInfo>>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
            inner: None,
        }
    }

    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    #[must_use]
    pub fn with_inner(mut self, inner: ExceptionInfo) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Capture an error and its `source()` chain.
    ///
    /// The outermost error carries the concrete type name; sources are only
    /// reachable as trait objects and are recorded as `dyn Error`.
    pub fn from_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        let mut info = ExceptionInfo::new(std::any::type_name::<E>(), error.to_string());
        info.inner = error.source().map(|source| Box::new(Self::from_source(source)));
        info
    }

    fn from_source(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut info = ExceptionInfo::new("dyn Error", error.to_string());
        info.inner = error.source().map(|source| Box::new(Self::from_source(source)));
        info
    }

    /// Iterate over this exception and every inner exception
    pub fn chain(&self) -> impl Iterator<Item = &ExceptionInfo> {
        std::iter::successors(Some(self), |e| e.inner.as_deref())
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if let Some(inner) = &self.inner {
            write!(f, " ---> {}", inner)?;
        }
        Ok(())
    }
}

/// Originating location of a log call, supplied by the caller.
///
/// Purely diagnostic: it is carried on the entry and in error reports and
/// never changes dispatch behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub member_name: Option<String>,
    pub file_path: Option<String>,
    pub line: Option<u32>,
}

impl CallerInfo {
    pub fn new(member_name: &str, file_path: &str, line: u32) -> Self {
        Self {
            member_name: Some(member_name.to_string()),
            file_path: Some(file_path.to_string()),
            line: Some(line),
        }
    }
}

impl fmt::Display for CallerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let member = self.member_name.as_deref().unwrap_or("?");
        match (&self.file_path, self.line) {
            (Some(file), Some(line)) => write!(f, "{} ({}:{})", member, file, line),
            (Some(file), None) => write!(f, "{} ({})", member, file),
            _ => write!(f, "{}", member),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
    #[serde(skip_serializing_if = "ExtendedProperties::is_empty", default)]
    pub extended_properties: ExtendedProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_process_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_activity_id: Option<String>,
    pub unique_id: Uuid,
    pub create_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<CallerInfo>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: Some(message.into()),
            exception: None,
            extended_properties: ExtendedProperties::new(),
            correlation_id: None,
            business_process_id: None,
            business_activity_id: None,
            unique_id: Uuid::new_v4(),
            create_time: Utc::now(),
            caller: None,
        }
    }

    /// An entry without a message
    pub fn empty(level: LogLevel) -> Self {
        Self {
            message: None,
            ..Self::new(level, String::new())
        }
    }

    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Attach an error and its source chain
    #[must_use]
    pub fn with_error<E: std::error::Error + ?Sized>(self, error: &E) -> Self {
        self.with_exception(ExceptionInfo::from_error(error))
    }

    #[must_use]
    pub fn with_property<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.extended_properties.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: ExtendedProperties) -> Self {
        self.extended_properties.extend(properties);
        self
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_business_process_id(mut self, id: impl Into<String>) -> Self {
        self.business_process_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_business_activity_id(mut self, id: impl Into<String>) -> Self {
        self.business_activity_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: CallerInfo) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Message text, or an empty string when none was given
    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}
