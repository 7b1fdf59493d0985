//! Secondary in-memory mirror of every rendered line
//!
//! Lines accumulate until either the size threshold or the flush interval is
//! reached, then they are appended to the buffer file in one go.

use crate::core::config::{DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL};
use crate::core::error::{LoggerError, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct FlushBuffer {
    lines: Vec<String>,
    threshold: usize,
    interval: Duration,
    last_flush: Instant,
}

impl FlushBuffer {
    pub fn new(threshold: usize, interval: Duration) -> Self {
        Self {
            lines: Vec::new(),
            threshold,
            interval,
            last_flush: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Either trigger fired: enough lines, or the interval elapsed since the last flush
    pub fn should_flush(&self, now: Instant) -> bool {
        self.lines.len() >= self.threshold
            || now.saturating_duration_since(self.last_flush) >= self.interval
    }

    /// Discard pending lines without writing them
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Append every pending line to `path`, then clear.
    ///
    /// On failure nothing is cleared, so the next flush retries the same
    /// lines. The file is exclusively locked while being written so that
    /// loggers sharing a directory never interleave their batches.
    pub fn flush_to(&mut self, path: &Path) -> Result<usize> {
        if self.lines.is_empty() {
            self.last_flush = Instant::now();
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LoggerError::io_operation("opening buffer file", path, e))?;
        file.lock_exclusive()
            .map_err(|e| LoggerError::io_operation("locking buffer file", path, e))?;

        let written = Self::write_lines(&file, &self.lines);
        let _ = FileExt::unlock(&file);
        written.map_err(|e| LoggerError::io_operation("writing buffer file", path, e))?;

        let count = self.lines.len();
        self.lines.clear();
        self.last_flush = Instant::now();
        Ok(count)
    }

    fn write_lines(file: &std::fs::File, lines: &[String]) -> std::io::Result<()> {
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }
}

impl Default for FlushBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL)
    }
}
