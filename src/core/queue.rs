//! FIFO hand-off between producers and the single worker
//!
//! Unbounded by default. A capacity turns on the configured
//! [`OverflowPolicy`]; `DropOldest` needs direct access to the head of the
//! queue, which is why this is a `VecDeque` behind a lock rather than a channel.

use super::log_entry::LogEntry;
use super::overflow_policy::OverflowPolicy;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Result of offering an entry to the queue
#[derive(Debug)]
pub enum PushOutcome {
    Queued,
    /// Queued after evicting the oldest pending entry
    QueuedEvicting,
    /// Discarded by the overflow policy
    Dropped,
    /// The queue is not accepting entries; the caller keeps ownership
    Closed(LogEntry),
}

struct QueueInner {
    entries: VecDeque<LogEntry>,
    running: bool,
    /// Entries popped by the worker but not yet marked done
    in_flight: usize,
}

pub struct EntryQueue {
    inner: Mutex<QueueInner>,
    /// Signalled when an entry arrives or the queue closes
    available: Condvar,
    /// Signalled when the worker frees a slot
    space: Condvar,
    /// Signalled when the queue becomes empty with nothing in flight
    idle: Condvar,
    capacity: Option<usize>,
    policy: OverflowPolicy,
}

impl EntryQueue {
    pub fn new(capacity: Option<usize>, policy: OverflowPolicy) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                entries: VecDeque::new(),
                running: false,
                in_flight: 0,
            }),
            available: Condvar::new(),
            space: Condvar::new(),
            idle: Condvar::new(),
            capacity,
            policy,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None, OverflowPolicy::default())
    }

    /// Start accepting entries
    pub fn open(&self) {
        self.inner.lock().running = true;
        self.idle.notify_all();
    }

    /// Stop accepting entries and wake every waiter.
    ///
    /// Entries already queued stay queued; [`pop`](Self::pop) keeps handing
    /// them out until the queue is empty.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.running = false;
        drop(inner);
        self.available.notify_all();
        self.space.notify_all();
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, entry: LogEntry) -> PushOutcome {
        let mut inner = self.inner.lock();
        if !inner.running {
            return PushOutcome::Closed(entry);
        }

        let mut evicted = false;
        if let Some(capacity) = self.capacity {
            if inner.entries.len() >= capacity {
                match self.policy {
                    OverflowPolicy::DropNewest => return PushOutcome::Dropped,
                    OverflowPolicy::DropOldest => {
                        inner.entries.pop_front();
                        evicted = true;
                    }
                    OverflowPolicy::Block => {
                        while inner.running && inner.entries.len() >= capacity {
                            self.space.wait(&mut inner);
                        }
                    }
                    OverflowPolicy::BlockWithTimeout(timeout) => {
                        let deadline = Instant::now() + timeout;
                        while inner.running && inner.entries.len() >= capacity {
                            if self.space.wait_until(&mut inner, deadline).timed_out() {
                                break;
                            }
                        }
                        if inner.running && inner.entries.len() >= capacity {
                            return PushOutcome::Dropped;
                        }
                    }
                }
                if !inner.running {
                    return PushOutcome::Closed(entry);
                }
            }
        }

        inner.entries.push_back(entry);
        drop(inner);
        self.available.notify_one();

        if evicted {
            PushOutcome::QueuedEvicting
        } else {
            PushOutcome::Queued
        }
    }

    /// Block until an entry is available.
    ///
    /// Returns `None` only once the queue is closed and fully drained.
    /// Every `Some` must be followed by [`task_done`](Self::task_done).
    pub fn pop(&self) -> Option<LogEntry> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(entry) = inner.entries.pop_front() {
                inner.in_flight += 1;
                drop(inner);
                self.space.notify_one();
                return Some(entry);
            }
            if !inner.running {
                return None;
            }
            self.available.wait(&mut inner);
        }
    }

    /// Mark an entry returned by [`pop`](Self::pop) as fully handled
    pub fn task_done(&self) {
        let mut inner = self.inner.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        let idle = inner.in_flight == 0 && inner.entries.is_empty();
        drop(inner);
        if idle {
            self.idle.notify_all();
        }
    }

    /// Wait until nothing is queued or in flight. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while inner.in_flight > 0 || !inner.entries.is_empty() {
            if self.idle.wait_until(&mut inner, deadline).timed_out() {
                return inner.in_flight == 0 && inner.entries.is_empty();
            }
        }
        true
    }

    /// Wait until a closed queue has handed out and finished every entry,
    /// or until it is reopened. Returns `false` on timeout.
    pub fn wait_drained(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while !inner.running && (inner.in_flight > 0 || !inner.entries.is_empty()) {
            if self.idle.wait_until(&mut inner, deadline).timed_out() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::sync::Arc;
    use std::thread;

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, "TEST", message)
    }

    fn drain(queue: &EntryQueue) -> Vec<String> {
        queue.close();
        let mut messages = Vec::new();
        while let Some(e) = queue.pop() {
            messages.push(e.message);
            queue.task_done();
        }
        messages
    }

    #[test]
    fn test_closed_queue_returns_entry() {
        let queue = EntryQueue::unbounded();
        match queue.push(entry("a")) {
            PushOutcome::Closed(e) => assert_eq!(e.message, "a"),
            other => panic!("expected Closed, got {:?}", other),
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_and_drain_after_close() {
        let queue = EntryQueue::unbounded();
        queue.open();
        for i in 0..5 {
            assert!(matches!(queue.push(entry(&i.to_string())), PushOutcome::Queued));
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(drain(&queue), vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_drop_newest() {
        let queue = EntryQueue::new(Some(2), OverflowPolicy::DropNewest);
        queue.open();
        queue.push(entry("a"));
        queue.push(entry("b"));
        assert!(matches!(queue.push(entry("c")), PushOutcome::Dropped));
        assert_eq!(drain(&queue), vec!["a", "b"]);
    }

    #[test]
    fn test_drop_oldest() {
        let queue = EntryQueue::new(Some(2), OverflowPolicy::DropOldest);
        queue.open();
        queue.push(entry("a"));
        queue.push(entry("b"));
        assert!(matches!(queue.push(entry("c")), PushOutcome::QueuedEvicting));
        assert_eq!(drain(&queue), vec!["b", "c"]);
    }

    #[test]
    fn test_block_with_timeout_drops_when_full() {
        let queue = EntryQueue::new(
            Some(1),
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(20)),
        );
        queue.open();
        queue.push(entry("a"));
        let start = Instant::now();
        assert!(matches!(queue.push(entry("b")), PushOutcome::Dropped));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_block_waits_for_consumer() {
        let queue = Arc::new(EntryQueue::new(Some(1), OverflowPolicy::Block));
        queue.open();
        queue.push(entry("a"));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || matches!(queue.push(entry("b")), PushOutcome::Queued))
        };

        thread::sleep(Duration::from_millis(20));
        let first = queue.pop().unwrap();
        queue.task_done();
        assert_eq!(first.message, "a");
        assert!(producer.join().unwrap());
        assert_eq!(drain(&queue), vec!["b"]);
    }

    #[test]
    fn test_close_wakes_blocked_consumer() {
        let queue = Arc::new(EntryQueue::unbounded());
        queue.open();
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop().is_none())
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(consumer.join().unwrap());
    }

    #[test]
    fn test_wait_drained_returns_on_reopen() {
        let queue = Arc::new(EntryQueue::unbounded());
        queue.open();
        queue.push(entry("pending"));
        queue.close();
        assert!(!queue.wait_drained(Duration::from_millis(10)));

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait_drained(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        queue.open();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_wait_idle() {
        let queue = Arc::new(EntryQueue::unbounded());
        queue.open();
        assert!(queue.wait_idle(Duration::from_millis(1)));

        queue.push(entry("a"));
        assert!(!queue.wait_idle(Duration::from_millis(10)));

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                while let Some(_e) = queue.pop() {
                    queue.task_done();
                }
            })
        };
        assert!(queue.wait_idle(Duration::from_secs(5)));
        queue.close();
        consumer.join().unwrap();
    }
}
