//! Console appender implementation

use crate::core::{Appender, LogEntry, LogLevel, Result};
use colored::Colorize;
use std::io::Write;

/// Best-effort terminal output; write errors are swallowed.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleAppender {
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Render the line with the level's color when colors are enabled
    pub fn decorate(&self, level: LogLevel, line: &str) -> String {
        if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line.to_string()
        }
    }

    /// Write one line. `println!` would panic on a closed stream, so this
    /// writes through the locked handle and ignores the result.
    pub fn write_line(&self, level: LogLevel, line: &str) {
        let output = self.decorate(level, line);

        // Route Error and Critical levels to stderr, others to stdout
        let _ = match level {
            LogLevel::Error | LogLevel::Critical => writeln!(std::io::stderr().lock(), "{}", output),
            _ => writeln!(std::io::stdout().lock(), "{}", output),
        };
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry, line: &str) -> Result<()> {
        self.write_line(entry.level, line);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
