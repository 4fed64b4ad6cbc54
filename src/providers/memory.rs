//! In-memory provider
//!
//! Captures entries for inspection. Clones share the same buffer, so a test
//! or host can keep one handle while the logger owns another.

use crate::core::{LogEntry, LogProvider, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemoryLogProvider {
    name: String,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogProvider {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Copy of every captured entry, in write order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages of every captured entry, in write order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|e| e.message_or_empty().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return every captured entry
    pub fn take(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl Default for MemoryLogProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogProvider for MemoryLogProvider {
    async fn write(&self, entry: &LogEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[tokio::test]
    async fn test_captures_in_order() {
        let provider = MemoryLogProvider::new();
        let handle = provider.clone();

        for i in 0..3 {
            provider
                .write(&LogEntry::new(LogLevel::Info, format!("Message {}", i)))
                .await
                .unwrap();
        }

        assert_eq!(handle.messages(), vec!["Message 0", "Message 1", "Message 2"]);
        assert_eq!(handle.take().len(), 3);
        assert!(provider.is_empty());
    }
}
