//! Response hand-off between the writer and the reader of the serial device

use dsfprinter_core::{latch, thread_safe_deque, Latch, ThreadSafeDeque};
use parking_lot::Condvar;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// FIFO of response lines waiting for `readline`.
///
/// Cloning yields another handle to the same queue. Once closed the queue
/// accepts nothing, but lines already queued can still be read.
#[derive(Clone)]
pub struct OutputQueue {
    lines: ThreadSafeDeque<String>,
    ready: Arc<Condvar>,
    closed: Latch,
}

impl Default for OutputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputQueue {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self {
            lines: thread_safe_deque(),
            ready: Arc::new(Condvar::new()),
            closed: latch(),
        }
    }

    /// Queue a line. Returns `false` if the queue is closed.
    pub fn push(&self, line: impl Into<String>) -> bool {
        let mut lines = self.lines.lock();
        if self.is_closed() {
            return false;
        }
        lines.push_back(line.into());
        self.ready.notify_one();
        true
    }

    /// Take the oldest line, waiting at most `timeout` for one to arrive
    pub fn pop_timeout(&self, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        let mut lines = self.lines.lock();
        loop {
            if let Some(line) = lines.pop_front() {
                return Some(line);
            }
            if self.is_closed() {
                return None;
            }
            if self.ready.wait_until(&mut lines, deadline).timed_out() {
                return lines.pop_front();
            }
        }
    }

    /// Close the queue and wake every waiting reader
    pub fn close(&self) {
        let _lines = self.lines.lock();
        self.closed.store(true, Ordering::SeqCst);
        self.ready.notify_all();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of queued lines
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether no line is queued
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}
