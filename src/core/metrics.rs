//! Logger metrics for observability
//!
//! Failures never reach producers, so these counters (together with the
//! error callback) are how a caller notices a degraded pipeline.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by producers and the worker
///
/// # Example
///
/// ```
/// use rust_queued_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_processed();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.processed_count(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    /// Entries pushed onto the queue
    enqueued: AtomicU64,

    /// Entries formatted and fanned out to sinks
    processed: AtomicU64,

    /// Entries discarded by the overflow policy
    dropped: AtomicU64,

    /// File sink writes that failed or were skipped
    file_write_failures: AtomicU64,

    /// Completed rotations
    rotations: AtomicU64,

    /// Rotations that hit a rename error
    rotation_failures: AtomicU64,

    /// Successful flushes of the secondary buffer
    buffer_flushes: AtomicU64,

    /// Failed flushes of the secondary buffer
    buffer_flush_failures: AtomicU64,
}

/// Point-in-time copy of [`LoggerMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub enqueued: u64,
    pub processed: u64,
    pub dropped: u64,
    pub file_write_failures: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
    pub buffer_flushes: u64,
    pub buffer_flush_failures: u64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            file_write_failures: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            buffer_flushes: AtomicU64::new(0),
            buffer_flush_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_count(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped entry, returning the previous total
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_write_failure(&self) -> u64 {
        self.file_write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_buffer_flush(&self) -> u64 {
        self.buffer_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_buffer_flush_failure(&self) -> u64 {
        self.buffer_flush_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Drop rate as a percentage of everything that was offered to the queue
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count();
        let total = self.enqueued_count() + dropped;
        if total == 0 {
            0.0
        } else {
            (dropped as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enqueued: self.enqueued_count(),
            processed: self.processed_count(),
            dropped: self.dropped_count(),
            file_write_failures: self.file_write_failures.load(Ordering::Relaxed),
            rotations: self.rotation_count(),
            rotation_failures: self.rotation_failures.load(Ordering::Relaxed),
            buffer_flushes: self.buffer_flushes.load(Ordering::Relaxed),
            buffer_flush_failures: self.buffer_flush_failures.load(Ordering::Relaxed),
        }
    }
}
