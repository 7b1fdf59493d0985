//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local cache for the producer id to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// One log event. Never mutated once handed to the logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
    pub origin_file: Option<String>,
    pub origin_line: Option<u32>,
    /// Identity of the producing thread, for diagnostics only
    pub producer_id: String,
}

impl LogEntry {
    /// Sanitize text to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so one entry always renders as exactly one line.
    fn sanitize(text: &str) -> String {
        text.replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, source: impl AsRef<str>, message: impl AsRef<str>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            source: Self::sanitize(source.as_ref()),
            message: Self::sanitize(message.as_ref()),
            origin_file: None,
            origin_line: None,
            producer_id: get_thread_id(),
        }
    }

    /// Attach the call site. An empty file or a zero line counts as unset.
    #[must_use]
    pub fn with_origin(mut self, file: &str, line: u32) -> Self {
        self.origin_file = (!file.is_empty()).then(|| file.to_string());
        self.origin_line = (line > 0).then_some(line);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "net\tio", "line one\nline two\r");
        assert_eq!(entry.message, "line one\\nline two\\r");
        assert_eq!(entry.source, "net\\tio");
    }

    #[test]
    fn test_origin_unset_values() {
        let entry = LogEntry::new(LogLevel::Info, "", "m").with_origin("", 10);
        assert_eq!(entry.origin_file, None);
        assert_eq!(entry.origin_line, Some(10));

        let entry = LogEntry::new(LogLevel::Info, "", "m").with_origin("main.rs", 0);
        assert_eq!(entry.origin_file.as_deref(), Some("main.rs"));
        assert_eq!(entry.origin_line, None);
    }

    #[test]
    fn test_producer_id_is_per_thread() {
        let here = LogEntry::new(LogLevel::Info, "", "a").producer_id;
        let again = LogEntry::new(LogLevel::Info, "", "b").producer_id;
        assert_eq!(here, again);

        let other = std::thread::spawn(|| LogEntry::new(LogLevel::Info, "", "c").producer_id)
            .join()
            .unwrap();
        assert_ne!(here, other);
    }
}
