//! Logging macros for ergonomic log message formatting.
//!
//! These macros take a source tag followed by `format!`-style arguments and
//! attach the call site (`file!()` / `line!()`) to the entry. The message is
//! only formatted when the level passes the logger's filter.
//!
//! # Examples
//!
//! ```no_run
//! use rust_queued_logger::prelude::*;
//! use rust_queued_logger::info;
//!
//! let logger = Logger::builder().build()?;
//!
//! // Basic logging
//! info!(logger, "APP", "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "NET", "Server listening on port {}", port);
//! # Ok::<(), LoggerError>(())
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```no_run
/// # use rust_queued_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_queued_logger::log;
/// log!(logger, LogLevel::Info, "APP", "Simple message");
/// log!(logger, LogLevel::Error, "HTTP", "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $source:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log_at(level, $source, format!($($arg)+), file!(), line!());
        }
    }};
}

/// Log a debug-level message.
///
/// ```no_run
/// # use rust_queued_logger::prelude::*;
/// # let logger = Logger::builder().min_level(LogLevel::Debug).build().unwrap();
/// use rust_queued_logger::debug;
/// debug!(logger, "CALC", "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $source:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $source, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $source:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $source, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```no_run
/// # use rust_queued_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_queued_logger::warning;
/// warning!(logger, "DISK", "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $source:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $source, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $source:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $source, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $source:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $source, $($arg)+)
    };
}
