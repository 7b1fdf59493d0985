//! Overflow policies for the bounded queue mode
//!
//! The queue is unbounded unless a capacity is configured. With a capacity,
//! these policies decide what happens to an entry that does not fit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Policy for handling queue overflow in async logging
///
/// # Example
///
/// ```
/// use rust_queued_logger::OverflowPolicy;
/// use std::time::Duration;
///
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::DropNewest);
///
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// assert_eq!(policy.to_string(), "BlockWithTimeout(100ms)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Discard the incoming entry
    #[default]
    DropNewest,

    /// Evict the oldest queued entry and admit the incoming one
    DropOldest,

    /// Wait until the worker frees space
    ///
    /// Warning: This applies backpressure to every producer.
    Block,

    /// Wait up to the timeout, then discard the incoming entry
    BlockWithTimeout(Duration),
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(OverflowPolicy::DropOldest.to_string(), "DropOldest");
        assert_eq!(
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(5)).to_string(),
            "BlockWithTimeout(5ms)"
        );
    }
}
