//! Size-based rotation of the active log file
//!
//! History is a fixed-depth ring: `app.log.1` is the newest rotated file and
//! `app.log.{max_backup_files}` the oldest; anything older is overwritten.

use crate::core::config::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE};
use crate::core::error::{LoggerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// When to rotate and how many rotated files to keep
///
/// # Examples
///
/// ```
/// use rust_queued_logger::appenders::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7);
/// assert!(policy.should_rotate(50 * 1024 * 1024));
/// assert!(!policy.should_rotate(1024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the active file reaches this many bytes
    pub max_bytes: u64,
    /// Maximum number of rotated files to keep
    pub max_backup_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_FILE_SIZE,
            max_backup_files: DEFAULT_MAX_FILES,
        }
    }
}

impl RotationPolicy {
    /// Create a new rotation policy with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_bytes = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        current_size >= self.max_bytes
    }

    /// Shift the rotated history up by one and move `base` to `base.1`.
    ///
    /// The caller must have closed its handle on `base`. Stops at the first
    /// rename error, leaving `base` in place so a later check can retry.
    pub fn rotate(&self, base: &Path) -> Result<()> {
        // A count of 0 or 1 skips the shift; `.1` is simply replaced
        for i in (1..self.max_backup_files).rev() {
            let old_path = backup_path(base, i);
            if old_path.exists() {
                let new_path = backup_path(base, i + 1);
                rename_replacing(&old_path, &new_path)?;
            }
        }

        if base.exists() {
            rename_replacing(base, &backup_path(base, 1))?;
        }
        Ok(())
    }
}

/// Get backup file path for given index
pub fn backup_path(base: &Path, index: usize) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "app.log".into());
    name.push(format!(".{}", index));
    base.with_file_name(name)
}

fn rename_replacing(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            // On some platforms, rename fails if destination exists
            if to.exists() {
                let _ = fs::remove_file(to);
            }
            fs::rename(from, to).map_err(|e| LoggerError::file_rotation(from, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_rotation_policy_builder() {
        let policy = RotationPolicy::new().with_max_size(1024).with_max_backups(3);
        assert_eq!(policy.max_bytes, 1024);
        assert_eq!(policy.max_backup_files, 3);
        assert!(policy.should_rotate(1024));
        assert!(!policy.should_rotate(1023));
    }

    #[test]
    fn test_default_policy() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
        assert_eq!(policy.max_backup_files, 5);
    }

    #[test]
    fn test_backup_path() {
        let base = Path::new("/var/log/app.log");
        assert_eq!(backup_path(base, 1), PathBuf::from("/var/log/app.log.1"));
        assert_eq!(backup_path(base, 12), PathBuf::from("/var/log/app.log.12"));
    }

    #[test]
    fn test_rotate_shifts_history() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        let policy = RotationPolicy::new().with_max_backups(3);

        fs::write(&base, "first").unwrap();
        policy.rotate(&base).unwrap();
        assert!(!base.exists());
        assert_eq!(read(&backup_path(&base, 1)), "first");

        fs::write(&base, "second").unwrap();
        policy.rotate(&base).unwrap();
        assert_eq!(read(&backup_path(&base, 1)), "second");
        assert_eq!(read(&backup_path(&base, 2)), "first");
    }

    #[test]
    fn test_rotate_is_bounded() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("ring.log");
        let policy = RotationPolicy::new().with_max_backups(2);

        for content in ["a", "b", "c", "d"] {
            fs::write(&base, content).unwrap();
            policy.rotate(&base).unwrap();
        }

        assert_eq!(read(&backup_path(&base, 1)), "d");
        assert_eq!(read(&backup_path(&base, 2)), "c");
        assert!(!backup_path(&base, 3).exists());
    }

    #[test]
    fn test_zero_backups_still_moves_active_file() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("zero.log");
        let policy = RotationPolicy::new().with_max_backups(0);

        fs::write(&base, "old").unwrap();
        policy.rotate(&base).unwrap();
        fs::write(&base, "new").unwrap();
        policy.rotate(&base).unwrap();

        assert!(!base.exists());
        assert_eq!(read(&backup_path(&base, 1)), "new");
        assert!(!backup_path(&base, 2).exists());
    }

    #[test]
    fn test_rotate_missing_base_is_ok() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("absent.log");
        assert!(RotationPolicy::new().rotate(&base).is_ok());
        assert!(!backup_path(&base, 1).exists());
    }
}
