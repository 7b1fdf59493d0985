//! Main logger implementation

use super::{
    appender::Appender,
    config::{self, LoggerConfig},
    error::{panic_message, ErrorCallback, LoggerError, Result},
    format::format_entry,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    overflow_policy::OverflowPolicy,
    queue::{EntryQueue, PushOutcome},
    stats::LoggerStats,
    worker::{Worker, WorkerState, WorkerStateCell},
};
use crate::appenders::{ConsoleAppender, FileAppender, FlushBuffer, RotationOutcome, RotationPolicy};
use parking_lot::Mutex;
use std::cell::Cell;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// This timeout is used when the logger is dropped without explicit shutdown,
/// and when switching from async to sync mode.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

thread_local! {
    /// Set while this thread is running an error callback
    static IN_ERROR_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

fn in_error_callback() -> bool {
    IN_ERROR_CALLBACK.with(Cell::get)
}

/// Configuration plus the flush buffer, guarded together
struct LoggerState {
    config: LoggerConfig,
    buffer: FlushBuffer,
}

/// Sink settings read in a single lock acquisition per entry
struct SinkSnapshot {
    console: bool,
    colors: bool,
    file: bool,
    path: PathBuf,
    rotation: RotationPolicy,
}

impl LoggerState {
    fn sinks(&self) -> SinkSnapshot {
        SinkSnapshot {
            console: self.config.console_enabled,
            colors: self.config.console_colors,
            file: self.config.file_enabled,
            path: self.config.active_path(),
            rotation: self.config.rotation_policy(),
        }
    }
}

/// Everything the producers and the worker thread share
struct Shared {
    state: Mutex<LoggerState>,
    files: Mutex<FileAppender>,
    appenders: Mutex<Vec<Box<dyn Appender>>>,
    queue: Arc<EntryQueue>,
    metrics: LoggerMetrics,
    on_error: Option<ErrorCallback>,
    /// Bound on every drain wait
    shutdown_timeout: Duration,
}

impl Shared {
    /// Hand a failure to the error callback.
    ///
    /// Failures raised while a callback is already running on this thread
    /// are not reported again, and a panicking callback is contained here.
    fn report(&self, error: &LoggerError) {
        let Some(ref callback) = self.on_error else {
            return;
        };
        if in_error_callback() {
            return;
        }

        IN_ERROR_CALLBACK.with(|flag| flag.set(true));
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(error)));
        IN_ERROR_CALLBACK.with(|flag| flag.set(false));

        if let Err(panic_info) = result {
            eprintln!(
                "[LOGGER CRITICAL] Error callback panicked: {}. Logging continues.",
                panic_message(panic_info.as_ref())
            );
        }
    }

    fn route(&self, entry: LogEntry, async_enabled: bool) {
        // Entries logged from inside the error callback are written in place
        // so a failing sink cannot feed itself through the queue.
        if async_enabled && !in_error_callback() {
            self.enqueue(entry);
        } else {
            self.dispatch(&entry);
        }
    }

    fn enqueue(&self, entry: LogEntry) {
        match self.queue.push(entry) {
            PushOutcome::Queued => {
                self.metrics.record_enqueued();
            }
            PushOutcome::QueuedEvicting => {
                self.metrics.record_enqueued();
                self.record_overflow();
            }
            PushOutcome::Dropped => self.record_overflow(),
            // A mode switch or shutdown closed the queue under us. Let the
            // worker finish what it holds so this producer's order is kept.
            PushOutcome::Closed(entry) => {
                self.queue.wait_drained(self.shutdown_timeout);
                self.dispatch(&entry);
            }
        }
    }

    fn record_overflow(&self) {
        let dropped_count = self.metrics.record_dropped() + 1;
        self.report(&LoggerError::QueueOverflow { dropped_count });
    }

    /// Format once, then fan out to every enabled sink and the flush buffer
    fn dispatch(&self, entry: &LogEntry) {
        let line = format_entry(entry);
        let sinks = self.state.lock().sinks();

        if sinks.console {
            ConsoleAppender::with_colors(sinks.colors).write_line(entry.level, &line);
        }
        if sinks.file {
            self.write_file(&sinks, &line);
        }
        self.write_appenders(entry, &line);
        self.buffer_line(line);
        self.metrics.record_processed();
    }

    fn write_file(&self, sinks: &SinkSnapshot, line: &str) {
        let outcome = {
            let mut files = self.files.lock();
            files.retarget(&sinks.path, sinks.rotation);
            files.write_line(line)
        };

        match outcome {
            Ok(RotationOutcome::NotNeeded) => {}
            Ok(RotationOutcome::Rotated) => {
                self.metrics.record_rotation();
            }
            Ok(RotationOutcome::Failed(e)) => {
                self.metrics.record_rotation_failure();
                self.report(&e);
            }
            Err(e) => {
                self.metrics.record_file_write_failure();
                self.report(&e);
            }
        }
    }

    /// Per-appender panic isolation: one failing appender never keeps the
    /// others from receiving the line.
    fn write_appenders(&self, entry: &LogEntry, line: &str) {
        let mut failures = Vec::new();
        {
            let mut appenders = self.appenders.lock();
            for appender in appenders.iter_mut() {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    appender.append(entry, line)
                }));
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => failures.push(e),
                    Err(panic_info) => {
                        eprintln!(
                            "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                             Other appenders continue to function.",
                            appender.name(),
                            panic_message(panic_info.as_ref())
                        );
                    }
                }
            }
        }
        for failure in &failures {
            self.report(failure);
        }
    }

    fn buffer_line(&self, line: String) {
        let failure = {
            let mut state = self.state.lock();
            state.buffer.push(line);
            if state.buffer.should_flush(Instant::now()) {
                let path = state.config.buffer_path();
                self.flush_buffer_locked(&mut state, &path).err()
            } else {
                None
            }
        };
        if let Some(e) = failure {
            self.report(&e);
        }
    }

    fn flush_buffer_locked(&self, state: &mut LoggerState, path: &Path) -> Result<()> {
        match state.buffer.flush_to(path) {
            Ok(0) => Ok(()),
            Ok(_) => {
                self.metrics.record_buffer_flush();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_buffer_flush_failure();
                Err(e)
            }
        }
    }

    fn flush_buffer(&self) -> Result<()> {
        let mut state = self.state.lock();
        let path = state.config.buffer_path();
        self.flush_buffer_locked(&mut state, &path)
    }

    fn flush_sinks(&self) -> Result<()> {
        self.files.lock().flush()?;
        for appender in self.appenders.lock().iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }
}

/// In-process logger with a background delivery queue.
///
/// Producers on any thread call [`log`](Self::log) or a level helper. In
/// async mode the entry is queued and a single worker thread writes it; in
/// sync mode the caller writes it before returning. Either way the rendered
/// line goes to the console, the active file (with size-based rotation), any
/// registered appenders, and the flush buffer.
///
/// # Example
///
/// ```no_run
/// use rust_queued_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .directory("logs")
///     .min_level(LogLevel::Debug)
///     .max_file_size(1024 * 1024)
///     .build()?;
///
/// logger.info("APP", "service started");
/// logger.warning("DB", "slow query");
/// # Ok::<(), rust_queued_logger::LoggerError>(())
/// ```
pub struct Logger {
    shared: Arc<Shared>,
    /// Lifecycle lock: serializes worker start/stop and mode switches
    worker: Mutex<Worker>,
    worker_state: Arc<WorkerStateCell>,
}

impl Logger {
    /// Build a logger from a validated configuration.
    ///
    /// Creates the log directory when it does not exist; a failure there is
    /// not fatal, the file sink simply skips writes until it can open the file.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::from_parts(config, Vec::new(), None, DEFAULT_SHUTDOWN_TIMEOUT)
    }

    fn from_parts(
        config: LoggerConfig,
        appenders: Vec<Box<dyn Appender>>,
        on_error: Option<ErrorCallback>,
        shutdown_timeout: Duration,
    ) -> Result<Self> {
        config.validate()?;

        let async_enabled = config.async_enabled;
        let directory_error = fs::create_dir_all(&config.directory)
            .err()
            .map(|e| LoggerError::io_operation("creating directory", &config.directory, e));

        let shared = Arc::new(Shared {
            files: Mutex::new(FileAppender::with_policy(
                config.active_path(),
                config.rotation_policy(),
            )),
            queue: Arc::new(EntryQueue::new(config.queue_capacity, config.overflow_policy)),
            state: Mutex::new(LoggerState {
                buffer: FlushBuffer::new(config.buffer_size, config.flush_interval),
                config,
            }),
            appenders: Mutex::new(appenders),
            metrics: LoggerMetrics::new(),
            on_error,
            shutdown_timeout,
        });

        if let Some(ref e) = directory_error {
            shared.report(e);
        }

        let worker = Worker::new();
        let logger = Self {
            worker_state: worker.state_handle(),
            worker: Mutex::new(worker),
            shared,
        };

        if async_enabled {
            logger.start_worker()?;
        }
        Ok(logger)
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use rust_queued_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .async_mode(true)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn start_worker(&self) -> Result<()> {
        let handler_shared = Arc::clone(&self.shared);
        self.worker
            .lock()
            .start(&self.shared.queue, move |entry| handler_shared.dispatch(&entry))
    }

    /// Level gate. Returns the dispatch mode when `level` passes the filter.
    fn admit(&self, level: LogLevel) -> Option<bool> {
        let state = self.shared.state.lock();
        (level >= state.config.min_level).then_some(state.config.async_enabled)
    }

    /// Whether an entry at `level` would currently be logged
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.admit(level).is_some()
    }

    pub fn log(&self, level: LogLevel, source: impl AsRef<str>, message: impl AsRef<str>) {
        if let Some(async_enabled) = self.admit(level) {
            self.shared
                .route(LogEntry::new(level, source, message), async_enabled);
        }
    }

    /// Log with the call site attached; see the `log!` family of macros
    pub fn log_at(
        &self,
        level: LogLevel,
        source: impl AsRef<str>,
        message: impl AsRef<str>,
        file: &str,
        line: u32,
    ) {
        if let Some(async_enabled) = self.admit(level) {
            let entry = LogEntry::new(level, source, message).with_origin(file, line);
            self.shared.route(entry, async_enabled);
        }
    }

    /// Log a pre-built entry, subject to the same level filter
    pub fn submit(&self, entry: LogEntry) {
        if let Some(async_enabled) = self.admit(entry.level) {
            self.shared.route(entry, async_enabled);
        }
    }

    #[inline]
    pub fn debug(&self, source: impl AsRef<str>, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, source, message);
    }

    #[inline]
    pub fn info(&self, source: impl AsRef<str>, message: impl AsRef<str>) {
        self.log(LogLevel::Info, source, message);
    }

    #[inline]
    pub fn warning(&self, source: impl AsRef<str>, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, source, message);
    }

    #[inline]
    pub fn error(&self, source: impl AsRef<str>, message: impl AsRef<str>) {
        self.log(LogLevel::Error, source, message);
    }

    #[inline]
    pub fn critical(&self, source: impl AsRef<str>, message: impl AsRef<str>) {
        self.log(LogLevel::Critical, source, message);
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.shared.appenders.lock().push(appender);
    }

    pub fn set_level(&self, level: LogLevel) {
        self.shared.state.lock().config.min_level = level;
    }

    /// Change the active file name. Takes effect on the next file write.
    pub fn set_file(&self, file_name: impl Into<String>) -> Result<()> {
        let file_name = file_name.into();
        config::validate_file_name("file_name", &file_name)?;

        let mut state = self.shared.state.lock();
        if file_name == state.config.buffer_file_name {
            return Err(LoggerError::config(
                "file_name",
                "must differ from the buffer file name",
            ));
        }
        state.config.file_name = file_name;
        Ok(())
    }

    /// Change the log directory, creating it first.
    ///
    /// The configuration is left untouched when the directory cannot be created.
    pub fn set_directory(&self, directory: impl Into<PathBuf>) -> Result<()> {
        let directory = directory.into();
        config::validate_directory(&directory)?;
        fs::create_dir_all(&directory)
            .map_err(|e| LoggerError::io_operation("creating directory", &directory, e))?;

        self.shared.state.lock().config.directory = directory;
        Ok(())
    }

    pub fn set_console_enabled(&self, enabled: bool) {
        self.shared.state.lock().config.console_enabled = enabled;
    }

    /// Toggle the file sink. Disabling it also releases open handles.
    pub fn set_file_enabled(&self, enabled: bool) {
        self.shared.state.lock().config.file_enabled = enabled;
        if !enabled {
            self.shared.files.lock().close_all();
        }
    }

    /// Switch between async and sync delivery.
    ///
    /// Going to sync drains and joins the worker before the flag flips, so
    /// the two never write concurrently. A drain timeout is reported as
    /// [`LoggerError::DrainTimeout`]; the switch still happens and the
    /// remaining entries finish in the background.
    pub fn set_async_enabled(&self, enabled: bool) -> Result<()> {
        let mut worker = self.worker.lock();
        if self.shared.state.lock().config.async_enabled == enabled {
            return Ok(());
        }

        if enabled {
            let handler_shared = Arc::clone(&self.shared);
            worker.start(&self.shared.queue, move |entry| handler_shared.dispatch(&entry))?;
            self.shared.state.lock().config.async_enabled = true;
            Ok(())
        } else {
            let stopped = worker.stop(&self.shared.queue, self.shared.shutdown_timeout);
            self.shared.state.lock().config.async_enabled = false;
            stopped
        }
    }

    pub fn set_max_file_size(&self, bytes: u64) -> Result<()> {
        config::validate_max_file_size(bytes)?;
        self.shared.state.lock().config.max_file_size = bytes;
        Ok(())
    }

    /// Set how many rotated files are kept. Negative counts are rejected;
    /// zero keeps only the most recent rotated file.
    pub fn set_max_files(&self, count: i64) -> Result<()> {
        let count = config::checked_max_files(count)?;
        self.shared.state.lock().config.max_files = count;
        Ok(())
    }

    /// Set the flush-buffer line threshold. Zero flushes on every line.
    pub fn set_buffer_size(&self, lines: usize) {
        let mut state = self.shared.state.lock();
        state.config.buffer_size = lines;
        state.buffer.set_threshold(lines);
    }

    pub fn set_flush_interval(&self, interval: Duration) {
        let mut state = self.shared.state.lock();
        state.config.flush_interval = interval;
        state.buffer.set_interval(interval);
    }

    /// Copy of the current configuration
    pub fn config(&self) -> LoggerConfig {
        self.shared.state.lock().config.clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker_state.get()
    }

    /// Snapshot of settings, queue length, buffer length and open handles
    pub fn stats(&self) -> LoggerStats {
        let (config, buffered_lines) = {
            let state = self.shared.state.lock();
            (state.config.clone(), state.buffer.len())
        };

        LoggerStats {
            directory: config.directory,
            file_name: config.file_name,
            min_level: config.min_level,
            console_enabled: config.console_enabled,
            file_enabled: config.file_enabled,
            async_enabled: config.async_enabled,
            max_file_size: config.max_file_size,
            max_files: config.max_files,
            buffer_size: config.buffer_size,
            flush_interval: config.flush_interval,
            queued_entries: self.shared.queue.len(),
            buffered_lines,
            open_files: self.shared.files.lock().open_count(),
            worker_state: self.worker_state.get(),
            metrics: self.shared.metrics.snapshot(),
        }
    }

    /// Last `count` lines of the active log file
    pub fn recent_lines(&self, count: usize) -> Result<Vec<String>> {
        let path = self.shared.state.lock().config.active_path();
        let file = File::open(&path).map_err(|e| LoggerError::io_operation("opening", &path, e))?;

        let mut lines = VecDeque::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| LoggerError::io_operation("reading", &path, e))?;
            if count == 0 {
                continue;
            }
            if lines.len() == count {
                lines.pop_front();
            }
            lines.push_back(line);
        }
        Ok(lines.into())
    }

    /// Truncate the active log file and discard unflushed buffer lines
    pub fn clear_logs(&self) -> Result<()> {
        let path = self.shared.state.lock().config.active_path();
        {
            let mut files = self.shared.files.lock();
            let policy = files.policy();
            files.retarget(&path, policy);
            files.truncate()?;
        }
        self.shared.state.lock().buffer.clear();
        Ok(())
    }

    /// Wait for queued entries to be written, then flush the buffer file,
    /// file handles and appenders.
    pub fn flush(&self) -> Result<()> {
        let timeout = self.shared.shutdown_timeout;
        if !self.shared.queue.wait_idle(timeout) {
            return Err(LoggerError::DrainTimeout { timeout });
        }
        self.shared.flush_buffer()?;
        self.shared.flush_sinks()
    }

    /// Gracefully shutdown the logger with a custom timeout
    ///
    /// Stops the worker after it drains every queued entry, flushes the
    /// buffer and closes all files. Logging afterwards still works, but
    /// synchronously. Calling it again is harmless.
    ///
    /// # Returns
    ///
    /// `true` if shutdown completed successfully within timeout, `false` otherwise
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let mut success = true;
        {
            let mut worker = self.worker.lock();
            if let Err(e) = worker.stop(&self.shared.queue, timeout) {
                self.shared.report(&e);
                success = false;
            }
            self.shared.state.lock().config.async_enabled = false;
        }

        if let Err(e) = self.shared.flush_buffer() {
            self.shared.report(&e);
            success = false;
        }
        if let Err(e) = self.shared.flush_sinks() {
            self.shared.report(&e);
            success = false;
        }
        self.shared.files.lock().close_all();
        success
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let timeout = self.shared.shutdown_timeout;
        if !self.shutdown(timeout) {
            eprintln!(
                "[LOGGER WARNING] Logger did not shut down cleanly within {:?}. \
                 Some logs may be lost.",
                timeout
            );
        }

        // Report any dropped logs
        let dropped = self.shared.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.shared.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use rust_queued_logger::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .directory("logs")
///     .file_name("service.log")
///     .min_level(LogLevel::Debug)
///     .max_file_size(5 * 1024 * 1024)
///     .max_files(3)
///     .queue_capacity(10_000)
///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
///     .on_error(Arc::new(|err| eprintln!("logger: {}", err)))
///     .build()
///     .expect("valid configuration");
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    appenders: Vec<Box<dyn Appender>>,
    on_error: Option<ErrorCallback>,
    shutdown_timeout: Duration,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            appenders: Vec::new(),
            on_error: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.config.file_name = file_name.into();
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.config.console_colors = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file(mut self, enabled: bool) -> Self {
        self.config.file_enabled = enabled;
        self
    }

    /// Enable or disable the background worker (enabled by default)
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, enabled: bool) -> Self {
        self.config.async_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_files(mut self, count: usize) -> Self {
        self.config.max_files = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn buffer_size(mut self, lines: usize) -> Self {
        self.config.buffer_size = lines;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// Bound the queue; see [`overflow_policy`](Self::overflow_policy)
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    /// Set the overflow policy for a bounded queue
    ///
    /// Default is `DropNewest`. Has no effect while the queue is unbounded.
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow_policy = policy;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Set a callback for failures that are not returned to producers
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_queued_logger::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let logger = Logger::builder()
    ///     .on_error(Arc::new(|err| eprintln!("Warning: {}", err)))
    ///     .build();
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Bound on how long a drain may take at shutdown or mode switch
    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        Logger::from_parts(
            self.config,
            self.appenders,
            self.on_error,
            self.shutdown_timeout,
        )
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};
    use tempfile::{tempdir, TempDir};

    /// Appender that records every line it receives
    struct Capture(Arc<Mutex<Vec<String>>>);

    impl Appender for Capture {
        fn append(&mut self, _entry: &LogEntry, line: &str) -> Result<()> {
            self.0.lock().push(line.to_string());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn quiet_builder(dir: &TempDir) -> LoggerBuilder {
        Logger::builder()
            .directory(dir.path())
            .console(false)
            .buffer_size(10_000)
            .flush_interval(Duration::from_secs(3600))
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        let err = quiet_builder(&dir).max_file_size(0).build().err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_async_worker_starts_and_stops() {
        let dir = tempdir().unwrap();
        let logger = quiet_builder(&dir).build().unwrap();
        assert_eq!(logger.worker_state(), WorkerState::Running);

        assert!(logger.shutdown(Duration::from_secs(5)));
        assert_eq!(logger.worker_state(), WorkerState::Stopped);
        assert!(!logger.config().async_enabled);

        // Second shutdown is a no-op
        assert!(logger.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn test_sync_logger_has_no_worker() {
        let dir = tempdir().unwrap();
        let logger = quiet_builder(&dir).async_mode(false).build().unwrap();
        assert_eq!(logger.worker_state(), WorkerState::Stopped);

        logger.info("T", "direct");
        assert_eq!(logger.recent_lines(1).unwrap().len(), 1);
    }

    #[test]
    fn test_level_filter_skips_everything() {
        let dir = tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let logger = quiet_builder(&dir)
            .min_level(LogLevel::Warning)
            .appender(Capture(Arc::clone(&seen)))
            .build()
            .unwrap();

        logger.debug("T", "hidden");
        logger.info("T", "hidden");
        assert_eq!(logger.stats().queued_entries, 0);
        assert_eq!(logger.metrics().enqueued_count(), 0);
        assert!(!logger.is_enabled(LogLevel::Info));
        assert!(logger.is_enabled(LogLevel::Error));

        logger.flush().unwrap();
        assert!(seen.lock().is_empty());
        assert_eq!(logger.stats().buffered_lines, 0);
    }

    #[test]
    fn test_setters_validate() {
        let dir = tempdir().unwrap();
        let logger = quiet_builder(&dir).async_mode(false).build().unwrap();

        assert!(logger.set_max_file_size(0).unwrap_err().is_configuration());
        assert!(logger.set_max_files(-1).unwrap_err().is_configuration());
        assert!(logger.set_file("").unwrap_err().is_configuration());
        assert!(logger.set_file("buffer.log").unwrap_err().is_configuration());

        let config = logger.config();
        assert_eq!(config.max_file_size, config::DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.max_files, 5);
        assert_eq!(config.file_name, "application.log");

        logger.set_max_files(0).unwrap();
        logger.set_max_file_size(2048).unwrap();
        logger.set_file("other.log").unwrap();
        let config = logger.config();
        assert_eq!(config.max_files, 0);
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.file_name, "other.log");
    }

    #[test]
    fn test_set_directory_creates_it() {
        let dir = tempdir().unwrap();
        let logger = quiet_builder(&dir).async_mode(false).build().unwrap();
        let nested = dir.path().join("a").join("b");

        logger.set_directory(&nested).unwrap();
        logger.info("T", "moved");

        assert!(nested.join("application.log").exists());
    }

    #[test]
    fn test_set_directory_failure_keeps_old_value() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let logger = quiet_builder(&dir).async_mode(false).build().unwrap();
        let err = logger.set_directory(blocker.join("child")).unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert_eq!(logger.config().directory, dir.path());
    }

    #[test]
    fn test_error_callback_sees_file_failures() {
        let dir = tempdir().unwrap();
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);

        let logger = quiet_builder(&dir)
            .async_mode(false)
            .on_error(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .build()
            .unwrap();

        // A directory where the active file should be makes every open fail
        fs::create_dir(dir.path().join("application.log")).unwrap();
        logger.error("T", "cannot land in the file");

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(logger.metrics().snapshot().file_write_failures, 1);
        assert_eq!(logger.stats().open_files, 0);
        // The buffer still got the line
        assert_eq!(logger.stats().buffered_lines, 1);
    }

    #[test]
    fn test_panicking_error_callback_is_contained() {
        let dir = tempdir().unwrap();
        let panicked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&panicked);

        let logger = quiet_builder(&dir)
            .on_error(Arc::new(move |_| {
                if !flag.swap(true, Ordering::SeqCst) {
                    panic!("callback exploded");
                }
            }))
            .build()
            .unwrap();

        let blocker = dir.path().join("application.log");
        fs::create_dir(&blocker).unwrap();
        logger.error("T", "lost to the file");
        logger.flush().unwrap();
        assert!(panicked.load(Ordering::SeqCst));

        fs::remove_dir(&blocker).unwrap();
        for i in 0..10 {
            logger.info("T", format!("after {}", i));
        }
        logger.flush().unwrap();

        assert_eq!(logger.worker_state(), WorkerState::Running);
        assert_eq!(logger.recent_lines(100).unwrap().len(), 10);
    }

    #[test]
    fn test_error_callback_may_log() {
        for async_mode in [false, true] {
            let dir = tempdir().unwrap();
            let calls = Arc::new(AtomicUsize::new(0));
            let slot: Arc<OnceLock<Weak<Logger>>> = Arc::new(OnceLock::new());

            let counter = Arc::clone(&calls);
            let target = Arc::clone(&slot);
            let logger = Arc::new(
                quiet_builder(&dir)
                    .async_mode(async_mode)
                    .on_error(Arc::new(move |err| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        if let Some(logger) = target.get().and_then(Weak::upgrade) {
                            logger.warning("CB", format!("write failed: {}", err));
                        }
                    }))
                    .build()
                    .unwrap(),
            );
            slot.set(Arc::downgrade(&logger)).unwrap();

            // The callback's own line fails the same way and must not recurse
            fs::create_dir(dir.path().join("application.log")).unwrap();
            logger.info("T", "blocked");
            assert!(logger.shared.queue.wait_idle(Duration::from_secs(5)));

            assert_eq!(calls.load(Ordering::SeqCst), 1, "async_mode={}", async_mode);
            assert_eq!(logger.metrics().snapshot().file_write_failures, 2);
            assert_eq!(logger.stats().buffered_lines, 2);
        }
    }

    #[test]
    fn test_panicking_appender_is_isolated() {
        struct Panics;
        impl Appender for Panics {
            fn append(&mut self, _entry: &LogEntry, _line: &str) -> Result<()> {
                panic!("appender exploded");
            }
            fn flush(&mut self) -> Result<()> {
                Ok(())
            }
            fn name(&self) -> &str {
                "panics"
            }
        }

        let dir = tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let logger = quiet_builder(&dir)
            .appender(Panics)
            .appender(Capture(Arc::clone(&seen)))
            .build()
            .unwrap();

        logger.info("T", "survives");
        logger.flush().unwrap();
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(logger.recent_lines(10).unwrap().len(), 1);
    }

    #[test]
    fn test_bounded_queue_reports_overflow() {
        let dir = tempdir().unwrap();
        let overflows = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&overflows);

        let logger = quiet_builder(&dir)
            .file(false)
            .queue_capacity(1)
            .overflow_policy(OverflowPolicy::DropNewest)
            .appender(Capture(Arc::new(Mutex::new(Vec::new()))))
            .on_error(Arc::new(move |err| {
                if matches!(err, LoggerError::QueueOverflow { .. }) {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }))
            .build()
            .unwrap();

        for i in 0..500 {
            logger.info("T", format!("flood {}", i));
        }
        logger.flush().unwrap();

        let snapshot = logger.metrics().snapshot();
        assert_eq!(snapshot.enqueued + snapshot.dropped, 500);
        assert_eq!(overflows.load(Ordering::SeqCst) as u64, snapshot.dropped);
        assert_eq!(snapshot.processed, snapshot.enqueued);
    }
}
