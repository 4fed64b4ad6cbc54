//! Context provider implementations

pub mod static_context;
pub mod thread;

pub use static_context::{ContextGuard, StaticContextProvider};
pub use thread::ThreadContextProvider;

// Re-export the trait so implementors need a single import
pub use crate::core::ContextProvider;
