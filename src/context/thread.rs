//! Thread identity context

use crate::core::{ContextProvider, ExtendedProperties, LogEntry, Result};
use std::cell::RefCell;

pub const THREAD_ID_KEY: &str = "ThreadId";
pub const THREAD_NAME_KEY: &str = "ThreadName";

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Adds the logging thread's id and name
///
/// Context providers run on the thread that issued the log call, so these
/// describe the caller rather than a dispatch worker.
#[derive(Debug, Clone, Default)]
pub struct ThreadContextProvider;

impl ThreadContextProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ContextProvider for ThreadContextProvider {
    fn contribute(&self, _entry: &LogEntry) -> Result<ExtendedProperties> {
        let mut properties = ExtendedProperties::new().with(THREAD_ID_KEY, current_thread_id());
        if let Some(name) = current_thread_name() {
            properties.insert(THREAD_NAME_KEY, name);
        }
        Ok(properties)
    }

    fn name(&self) -> &str {
        "thread"
    }
}
