//! # Rust Queued Logger
//!
//! An in-process logger that hands entries to a single background worker
//! and writes them to the console, a size-rotated log file and a periodically
//! flushed buffer file.
//!
//! ## Features
//!
//! - **Async or sync delivery**: switch at runtime; queued entries are drained first
//! - **Size-based rotation**: `app.log` → `app.log.1` … `app.log.N`
//! - **Flush buffer**: a second copy of every line, written in batches
//! - **Thread safe**: any thread may log, reconfigure or query statistics
//!
//! ## Example
//!
//! ```no_run
//! use rust_queued_logger::prelude::*;
//! use rust_queued_logger::info;
//!
//! let logger = Logger::builder().directory("logs").build()?;
//! info!(logger, "NET", "listening on port {}", 8080);
//! logger.set_level(LogLevel::Warning);
//! println!("{}", logger.stats());
//! # Ok::<(), LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, RotationPolicy};
    pub use crate::core::{
        Appender, ErrorCallback, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, LoggerStats, OverflowPolicy, Result, WorkerState,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

pub use appenders::{ConsoleAppender, FileAppender, RotationPolicy};
pub use core::{
    format_entry, Appender, ErrorCallback, LogEntry, LogLevel, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, LoggerStats, MetricsSnapshot, OverflowPolicy,
    Result, WorkerState, DEFAULT_SHUTDOWN_TIMEOUT,
};
