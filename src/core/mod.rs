//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod format;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod queue;
pub mod stats;
pub mod worker;

pub use appender::Appender;
pub use config::LoggerConfig;
pub use error::{ErrorCallback, LoggerError, Result};
pub use format::{format_entry, DEFAULT_SOURCE};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::{LoggerMetrics, MetricsSnapshot};
pub use overflow_policy::OverflowPolicy;
pub use queue::{EntryQueue, PushOutcome};
pub use stats::LoggerStats;
pub use worker::WorkerState;
