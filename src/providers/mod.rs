//! Log provider implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleLogProvider;
#[cfg(feature = "file")]
pub use file::{FileFormat, FileLogProvider};
pub use memory::MemoryLogProvider;

// Re-export the trait so implementors need a single import
pub use crate::core::LogProvider;

use crate::core::LogEntry;

/// Escape control characters so a message cannot forge extra log lines
pub(crate) fn escape_message(message: &str) -> String {
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Single-line text rendering shared by the text providers
///
/// `level` is passed pre-rendered so callers can colour it.
pub(crate) fn text_line(entry: &LogEntry, level: &str) -> String {
    let mut line = format!(
        "[{}] [{}] {}",
        entry.create_time.format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        escape_message(entry.message_or_empty())
    );

    if !entry.extended_properties.is_empty() {
        line.push_str(" | ");
        line.push_str(&escape_message(&entry.extended_properties.format_fields()));
    }

    if let Some(ref exception) = entry.exception {
        line.push_str(" | ");
        line.push_str(&escape_message(&exception.to_string()));
    }

    if let Some(ref caller) = entry.caller {
        line.push_str(&format!(" ({})", caller));
    }

    line
}
