//! Background consumer for async mode
//!
//! State machine: `Stopped -> Running -> Draining -> Stopped`. At most one
//! worker thread drains a given queue at any time.

use super::error::{panic_message, LoggerError, Result};
use super::log_entry::LogEntry;
use super::queue::EntryQueue;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Stopped = 0,
    Running = 1,
    Draining = 2,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Stopped => write!(f, "stopped"),
            WorkerState::Running => write!(f, "running"),
            WorkerState::Draining => write!(f, "draining"),
        }
    }
}

/// Lock-free view of the worker state, readable while a drain is in progress
#[derive(Debug)]
pub struct WorkerStateCell(AtomicU8);

impl WorkerStateCell {
    fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Stopped as u8))
    }

    pub fn get(&self) -> WorkerState {
        match self.0.load(Ordering::Acquire) {
            1 => WorkerState::Running,
            2 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

pub struct Worker {
    handle: Option<thread::JoinHandle<()>>,
    /// Receives once the thread has drained the closed queue
    done: Option<Receiver<()>>,
    state: Arc<WorkerStateCell>,
}

impl Worker {
    pub fn new() -> Self {
        Self {
            handle: None,
            done: None,
            state: Arc::new(WorkerStateCell::new()),
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    pub fn state_handle(&self) -> Arc<WorkerStateCell> {
        Arc::clone(&self.state)
    }

    /// Open the queue and spawn the consumer thread.
    ///
    /// A no-op while a worker is running. If an earlier stop timed out, this
    /// first waits for that worker to finish draining.
    pub fn start<F>(&mut self, queue: &Arc<EntryQueue>, mut handler: F) -> Result<()>
    where
        F: FnMut(LogEntry) + Send + 'static,
    {
        match self.state.get() {
            WorkerState::Running => return Ok(()),
            WorkerState::Draining => {
                self.finish_drain(None);
            }
            WorkerState::Stopped => {}
        }

        queue.open();
        let (done_tx, done_rx) = bounded(1);
        let worker_queue = Arc::clone(queue);

        let spawned = thread::Builder::new()
            .name("log-worker".to_string())
            .spawn(move || {
                while let Some(entry) = worker_queue.pop() {
                    // One bad entry must not take the consumer down with it
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        handler(entry)
                    }));
                    if let Err(panic_info) = result {
                        eprintln!(
                            "[LOGGER CRITICAL] Async worker panicked while writing an entry: {}. \
                             The worker keeps running.",
                            panic_message(panic_info.as_ref())
                        );
                    }
                    worker_queue.task_done();
                }
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                self.done = Some(done_rx);
                self.state.set(WorkerState::Running);
                Ok(())
            }
            Err(e) => {
                queue.close();
                Err(LoggerError::WorkerSpawn(e))
            }
        }
    }

    /// Close the queue, let the worker drain it, then join.
    ///
    /// Stopping a stopped worker is a no-op. On timeout the worker keeps
    /// draining in the background and the state stays `Draining`.
    pub fn stop(&mut self, queue: &EntryQueue, timeout: Duration) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }

        self.state.set(WorkerState::Draining);
        queue.close();

        if self.finish_drain(Some(timeout)) {
            Ok(())
        } else {
            Err(LoggerError::DrainTimeout { timeout })
        }
    }

    /// Wait for the drain signal (forever when `timeout` is `None`) and join.
    fn finish_drain(&mut self, timeout: Option<Duration>) -> bool {
        if let Some(ref done) = self.done {
            let finished = match timeout {
                Some(timeout) => !matches!(
                    done.recv_timeout(timeout),
                    Err(RecvTimeoutError::Timeout)
                ),
                // Err means the thread exited without signalling, i.e. it panicked
                None => {
                    let _ = done.recv();
                    true
                }
            };
            if !finished {
                return false;
            }
        }

        self.done = None;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Async worker thread panicked: {:?}", e);
            }
        }
        self.state.set(WorkerState::Stopped);
        true
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}
