//! Text rendering of log entries
//!
//! Every sink and the flush buffer consume the same rendered line:
//!
//! ```text
//! 2025-01-08 10:30:45.123 [INFO ] [NET] [ThreadId(2)] [server.rs:42] listening
//! ```

use super::log_entry::LogEntry;
use std::fmt::Write;

/// Source tag used when an entry has none
pub const DEFAULT_SOURCE: &str = "MAIN";

/// strftime pattern for the leading timestamp, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Render an entry as a single line without a trailing newline.
#[must_use]
pub fn format_entry(entry: &LogEntry) -> String {
    let source = if entry.source.is_empty() {
        DEFAULT_SOURCE
    } else {
        entry.source.as_str()
    };

    let mut line = String::with_capacity(64 + entry.message.len());
    // Writing into a String cannot fail
    let _ = write!(
        line,
        "{} [{}] [{}] [{}] ",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        entry.level.label(),
        source,
        entry.producer_id
    );

    if let Some(ref file) = entry.origin_file {
        line.push('[');
        line.push_str(file);
        if let Some(number) = entry.origin_line {
            let _ = write!(line, ":{}", number);
        }
        line.push_str("] ");
    }

    line.push_str(&entry.message);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use chrono::{Local, TimeZone};

    fn fixed_entry(level: LogLevel, source: &str, message: &str) -> LogEntry {
        let timestamp = Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::milliseconds(7);
        let mut entry = LogEntry::new(level, source, message).with_timestamp(timestamp);
        entry.producer_id = "ThreadId(9)".to_string();
        entry
    }

    #[test]
    fn test_full_line() {
        let entry = fixed_entry(LogLevel::Warning, "NET", "slow peer").with_origin("net.rs", 42);
        assert_eq!(
            format_entry(&entry),
            "2025-01-08 10:30:45.007 [WARN ] [NET] [ThreadId(9)] [net.rs:42] slow peer"
        );
    }

    #[test]
    fn test_origin_omitted_when_unset() {
        let entry = fixed_entry(LogLevel::Info, "DB", "connected");
        assert_eq!(
            format_entry(&entry),
            "2025-01-08 10:30:45.007 [INFO ] [DB] [ThreadId(9)] connected"
        );
    }

    #[test]
    fn test_file_without_line() {
        let entry = fixed_entry(LogLevel::Error, "DB", "lost").with_origin("db.rs", 0);
        assert!(format_entry(&entry).ends_with("[ThreadId(9)] [db.rs] lost"));
    }

    #[test]
    fn test_empty_source_uses_default() {
        let entry = fixed_entry(LogLevel::Critical, "", "boom");
        assert!(format_entry(&entry).contains("[CRIT ] [MAIN] "));
    }
}
