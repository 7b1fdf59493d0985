//! Error types for the logger system

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Callback invoked for failures that never reach the producer
///
/// Log calls are fire-and-forget, so sink, rotation and flush failures are
/// reported here instead of being returned.
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Rejected configuration value
    #[error("Invalid configuration for {setting}: {message}")]
    Configuration { setting: String, message: String },

    /// IO error with the operation and path that failed
    #[error("IO error while {operation} '{path}': {source}")]
    IoOperation {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Rename during rotation failed
    #[error("File rotation failed for '{path}': {source}")]
    FileRotation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Bounded queue dropped an entry
    #[error("Log queue overflow: dropped {dropped_count} messages")]
    QueueOverflow { dropped_count: u64 },

    /// Background worker could not be started
    #[error("Failed to spawn log worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Queued entries were not drained in time
    #[error("Log queue did not drain within {timeout:?}")]
    DrainTimeout { timeout: Duration },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoggerError {
    /// Create a configuration error
    pub fn config(setting: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Configuration {
            setting: setting.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        path: &Path,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: &Path, source: std::io::Error) -> Self {
        LoggerError::FileRotation {
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether this error was caused by a rejected setting
    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::Configuration { .. })
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("max_files", "must not be negative");
        assert!(err.is_configuration());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LoggerError::file_rotation(&PathBuf::from("/var/log/app.log"), io_err);
        assert!(matches!(err, LoggerError::FileRotation { .. }));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("max_file_size", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for max_file_size: must be greater than zero"
        );

        let err = LoggerError::QueueOverflow { dropped_count: 3 };
        assert_eq!(err.to_string(), "Log queue overflow: dropped 3 messages");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening", &PathBuf::from("logs/app.log"), io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        let text = err.to_string();
        assert!(text.contains("opening 'logs/app.log'"));
        assert!(text.contains("access denied"));
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static text");

        let payload = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "code 7");
    }
}
