//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};

/// A destination for rendered log lines.
///
/// `line` is the entry already rendered by [`format_entry`](crate::core::format::format_entry);
/// the entry is passed along for appenders that route on level or source.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
