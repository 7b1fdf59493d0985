//! Logger configuration
//!
//! One [`LoggerConfig`] belongs to one logger instance; there is no process-wide
//! state, so independent loggers can run side by side.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::overflow_policy::OverflowPolicy;
use crate::appenders::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DIRECTORY: &str = "logs";
pub const DEFAULT_FILE_NAME: &str = "application.log";
pub const DEFAULT_BUFFER_FILE_NAME: &str = "buffer.log";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_BUFFER_SIZE: usize = 1000;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Settings for a [`Logger`](crate::Logger)
///
/// # Examples
///
/// ```
/// use rust_queued_logger::{LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::new()
///     .with_directory("/tmp/app-logs")
///     .with_min_level(LogLevel::Debug)
///     .with_max_file_size(1024 * 1024)
///     .with_max_files(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub min_level: LogLevel,
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub async_enabled: bool,
    /// Rotation threshold for the active file, in bytes
    pub max_file_size: u64,
    /// Number of rotated files kept (`.1` ..= `.max_files`)
    pub max_files: usize,
    /// Flush the secondary buffer once it holds this many lines
    pub buffer_size: usize,
    /// Written as a human-readable duration such as `"5s"` or `"250ms"`
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    pub buffer_file_name: String,
    pub console_colors: bool,
    /// `None` keeps the queue unbounded
    pub queue_capacity: Option<usize>,
    pub overflow_policy: OverflowPolicy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            file_name: DEFAULT_FILE_NAME.to_string(),
            min_level: LogLevel::Info,
            console_enabled: true,
            file_enabled: true,
            async_enabled: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            buffer_file_name: DEFAULT_BUFFER_FILE_NAME.to_string(),
            console_colors: true,
            queue_capacity: None,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LoggerError::io_operation("reading config", path, e))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.file_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_async(mut self, enabled: bool) -> Self {
        self.async_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffer_size(mut self, lines: usize) -> Self {
        self.buffer_size = lines;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffer_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.buffer_file_name = file_name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Check every setting, returning the first violation
    pub fn validate(&self) -> Result<()> {
        validate_directory(&self.directory)?;
        validate_file_name("file_name", &self.file_name)?;
        validate_file_name("buffer_file_name", &self.buffer_file_name)?;
        validate_max_file_size(self.max_file_size)?;
        if self.file_name == self.buffer_file_name {
            return Err(LoggerError::config(
                "buffer_file_name",
                "must differ from the active log file name",
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(LoggerError::config(
                "queue_capacity",
                "must be greater than zero when set",
            ));
        }
        Ok(())
    }

    /// Path of the active log file
    pub fn active_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Path of the secondary buffer log
    pub fn buffer_path(&self) -> PathBuf {
        self.directory.join(&self.buffer_file_name)
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size(self.max_file_size)
            .with_max_backups(self.max_files)
    }
}

pub(crate) fn validate_directory(directory: &Path) -> Result<()> {
    if directory.as_os_str().is_empty() {
        return Err(LoggerError::config("directory", "must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_file_name(setting: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LoggerError::config(setting, "must not be empty"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(LoggerError::config(
            setting,
            format!("'{}' must be a plain file name", name),
        ));
    }
    Ok(())
}

pub(crate) fn validate_max_file_size(bytes: u64) -> Result<()> {
    if bytes == 0 {
        return Err(LoggerError::config(
            "max_file_size",
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Convert a signed rotated-file count, rejecting negatives
pub(crate) fn checked_max_files(count: i64) -> Result<usize> {
    usize::try_from(count).map_err(|_| {
        LoggerError::config("max_files", format!("{} must not be negative", count))
    })
}
