//! File appender implementation
//!
//! Keeps one append-mode handle per path, opened on first write, and runs
//! the rotation check after every successful write.

use super::rotating_file::RotationPolicy;
use crate::core::{Appender, LogEntry, LoggerError, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What happened after a successful write
#[derive(Debug)]
pub enum RotationOutcome {
    NotNeeded,
    Rotated,
    /// The line was written but rotation failed; the file stays oversized
    Failed(LoggerError),
}

pub struct FileAppender {
    handles: HashMap<PathBuf, BufWriter<File>>,
    target: PathBuf,
    policy: RotationPolicy,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_policy(path, RotationPolicy::default())
    }

    pub fn with_policy(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            handles: HashMap::new(),
            target: path.into(),
            policy,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Point at a (possibly new) active path, closing the old path's handle
    pub fn retarget(&mut self, path: &Path, policy: RotationPolicy) {
        if self.target != path {
            let old = std::mem::replace(&mut self.target, path.to_path_buf());
            self.close(&old);
        }
        self.policy = policy;
    }

    /// Number of currently open handles
    pub fn open_count(&self) -> usize {
        self.handles.len()
    }

    fn handle_for(&mut self, path: &Path) -> Result<&mut BufWriter<File>> {
        match self.handles.entry(path.to_path_buf()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| LoggerError::io_operation("opening", path, e))?;
                Ok(slot.insert(BufWriter::new(file)))
            }
        }
    }

    /// Append one line to the active file, flush it, then check rotation.
    pub fn write_line(&mut self, line: &str) -> Result<RotationOutcome> {
        let path = self.target.clone();
        let writer = self.handle_for(&path)?;

        let written = writeln!(writer, "{}", line).and_then(|()| writer.flush());
        let size = match written.and_then(|()| writer.get_ref().metadata()) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                // Drop the handle so the next write starts from a fresh open
                self.close(&path);
                return Err(LoggerError::io_operation("writing", &path, e));
            }
        };

        if !self.policy.should_rotate(size) {
            return Ok(RotationOutcome::NotNeeded);
        }

        self.close(&path);
        match self.policy.rotate(&path) {
            Ok(()) => Ok(RotationOutcome::Rotated),
            Err(e) => Ok(RotationOutcome::Failed(e)),
        }
    }

    /// Flush and release the handle for `path`, if any
    pub fn close(&mut self, path: &Path) {
        if let Some(mut writer) = self.handles.remove(path) {
            let _ = writer.flush();
        }
    }

    pub fn close_all(&mut self) {
        for (_, mut writer) in self.handles.drain() {
            let _ = writer.flush();
        }
    }

    /// Empty the active file, closing its handle first
    pub fn truncate(&mut self) -> Result<()> {
        let path = self.target.clone();
        self.close(&path);
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| LoggerError::io_operation("truncating", &path, e))?;
        Ok(())
    }
}

impl Appender for FileAppender {
    fn append(&mut self, _entry: &LogEntry, line: &str) -> Result<()> {
        match self.write_line(line)? {
            RotationOutcome::Failed(e) => Err(e),
            RotationOutcome::NotNeeded | RotationOutcome::Rotated => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        for (path, writer) in self.handles.iter_mut() {
            writer
                .flush()
                .map_err(|e| LoggerError::io_operation("flushing", path, e))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        self.close_all();
    }
}
