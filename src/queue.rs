//! Bounded, blocking, multi-producer/multi-consumer message queue.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::deadline::Deadline;
use crate::error::QueueError;
use crate::invariants::debug_assert_queue_bounded;

/// Maximum number of pending messages an [`AsyncQueue`] holds at once.
///
/// Pushes beyond this block (or time out) rather than growing the
/// queue.
pub const ASYNC_QUEUE_CAPACITY: usize = 128;

struct State {
    messages: VecDeque<Vec<u8>>,
}

/// A bounded FIFO queue of byte messages, safe to share between
/// threads via an `Arc`.
///
/// Producers and consumers block on the queue being full or empty
/// respectively, up to a caller-supplied [`Deadline`]. Internally this
/// is a `Mutex` guarding a `VecDeque`, plus two `Condvar`s: one signals
/// "space became available", the other "a message became available".
pub struct AsyncQueue {
    state: Mutex<State>,
    space_available: Condvar,
    message_available: Condvar,
}

impl Default for AsyncQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncQueue {
    /// Creates a new, empty queue with capacity
    /// [`ASYNC_QUEUE_CAPACITY`].
    pub fn new() -> Self {
        AsyncQueue {
            state: Mutex::new(State {
                messages: VecDeque::with_capacity(ASYNC_QUEUE_CAPACITY),
            }),
            space_available: Condvar::new(),
            message_available: Condvar::new(),
        }
    }

    /// Number of messages currently pending.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    /// True if no messages are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes `data` onto the queue, blocking until space is
    /// available or `deadline` passes.
    ///
    /// Returns [`QueueError::TimedOut`] if `deadline` passes first, or
    /// [`QueueError::OutOfMemory`] if copying `data` into an owned
    /// message fails to allocate. There is no path here that can
    /// return with the queue's mutex still held: `MutexGuard`'s `Drop`
    /// releases it on every return, including the out-of-memory path.
    pub fn push_timed(&self, data: &[u8], deadline: Deadline) -> Result<(), QueueError> {
        let mut guard = self.state.lock().unwrap();
        loop {
            if guard.messages.len() < ASYNC_QUEUE_CAPACITY {
                break;
            }
            if deadline.has_passed() {
                return Err(QueueError::TimedOut);
            }
            guard = match deadline.remaining() {
                None => self.space_available.wait(guard).unwrap(),
                Some(remaining) => {
                    let (g, timeout) = self.space_available.wait_timeout(guard, remaining).unwrap();
                    if timeout.timed_out() && g.messages.len() >= ASYNC_QUEUE_CAPACITY {
                        return Err(QueueError::TimedOut);
                    }
                    g
                }
            };
        }

        let mut message = Vec::new();
        message
            .try_reserve_exact(data.len())
            .map_err(|_| QueueError::OutOfMemory)?;
        message.extend_from_slice(data);

        guard.messages.push_back(message);
        debug_assert_queue_bounded!(guard.messages.len(), ASYNC_QUEUE_CAPACITY);
        drop(guard);
        self.message_available.notify_all();
        Ok(())
    }

    /// Pushes `data` onto the queue without blocking: fails with
    /// [`QueueError::TimedOut`] immediately if the queue is full.
    pub fn try_push(&self, data: &[u8]) -> Result<(), QueueError> {
        self.push_timed(data, Deadline::expired())
    }

    /// Pushes `data` onto the queue, blocking indefinitely until space
    /// is available.
    pub fn push(&self, data: &[u8]) -> Result<(), QueueError> {
        self.push_timed(data, Deadline::Never)
    }

    /// Pops the oldest pending message, blocking until one is
    /// available or `deadline` passes.
    pub fn pop_timed(&self, deadline: Deadline) -> Result<Vec<u8>, QueueError> {
        let mut guard = self.state.lock().unwrap();
        loop {
            if let Some(message) = guard.messages.pop_front() {
                debug_assert_queue_bounded!(guard.messages.len(), ASYNC_QUEUE_CAPACITY);
                drop(guard);
                self.space_available.notify_all();
                return Ok(message);
            }
            if deadline.has_passed() {
                return Err(QueueError::TimedOut);
            }
            guard = match deadline.remaining() {
                None => self.message_available.wait(guard).unwrap(),
                Some(remaining) => {
                    let (g, timeout) = self.message_available.wait_timeout(guard, remaining).unwrap();
                    if timeout.timed_out() && g.messages.is_empty() {
                        return Err(QueueError::TimedOut);
                    }
                    g
                }
            };
        }
    }

    /// Pops the oldest pending message without blocking: fails with
    /// [`QueueError::TimedOut`] immediately if the queue is empty.
    pub fn try_pop(&self) -> Result<Vec<u8>, QueueError> {
        self.pop_timed(Deadline::expired())
    }

    /// Pops the oldest pending message, blocking indefinitely until
    /// one is available.
    pub fn pop(&self) -> Result<Vec<u8>, QueueError> {
        self.pop_timed(Deadline::Never)
    }
}
