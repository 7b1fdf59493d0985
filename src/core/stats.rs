//! Read-only statistics snapshot

use super::log_level::LogLevel;
use super::metrics::MetricsSnapshot;
use super::worker::WorkerState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Current settings plus queue, buffer and handle counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerStats {
    pub directory: PathBuf,
    pub file_name: String,
    pub min_level: LogLevel,
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub async_enabled: bool,
    pub max_file_size: u64,
    pub max_files: usize,
    pub buffer_size: usize,
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    /// Entries waiting in the queue
    pub queued_entries: usize,
    /// Lines waiting in the flush buffer
    pub buffered_lines: usize,
    pub open_files: usize,
    pub worker_state: WorkerState,
    pub metrics: MetricsSnapshot,
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

impl fmt::Display for LoggerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== LOGGER STATISTICS ===")?;
        writeln!(f, "Log directory:     {}", self.directory.display())?;
        writeln!(f, "Log file:          {}", self.file_name)?;
        writeln!(f, "Minimum level:     {}", self.min_level.label())?;
        writeln!(f, "Console output:    {}", on_off(self.console_enabled))?;
        writeln!(f, "File output:       {}", on_off(self.file_enabled))?;
        writeln!(f, "Async mode:        {} ({})", on_off(self.async_enabled), self.worker_state)?;
        writeln!(f, "Max file size:     {} bytes", self.max_file_size)?;
        writeln!(f, "Max files:         {}", self.max_files)?;
        writeln!(f, "Buffer size:       {}", self.buffer_size)?;
        writeln!(f, "Flush interval:    {:?}", self.flush_interval)?;
        writeln!(f, "Buffered lines:    {}", self.buffered_lines)?;
        writeln!(f, "Queued entries:    {}", self.queued_entries)?;
        writeln!(f, "Open files:        {}", self.open_files)?;
        write!(
            f,
            "Processed/dropped: {}/{}",
            self.metrics.processed, self.metrics.dropped
        )
    }
}
