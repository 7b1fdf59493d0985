//! Appender implementations

pub mod buffer;
pub mod console;
pub mod file;
pub mod rotating_file;

pub use buffer::FlushBuffer;
pub use console::ConsoleAppender;
pub use file::{FileAppender, RotationOutcome};
pub use rotating_file::{backup_path, RotationPolicy};

// Re-export trait so custom appenders need a single import
pub use crate::core::Appender;
