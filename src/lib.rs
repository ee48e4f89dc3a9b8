//! Scatter/gather byte buffer and bounded blocking message queue
//!
//! This crate supplies two composable building blocks for moving
//! streaming byte data between producers and consumers:
//!
//! - [`AppendBuffer`] — an appendable scatter/gather byte buffer built
//!   from fixed-capacity pieces, with a head-trimming cursor, a
//!   forward byte iterator, and a zero-copy direct-write API for
//!   filling the buffer in place (e.g. from a `read()` syscall).
//!
//! - [`AsyncQueue`] — a bounded, blocking, multi-producer/multi-consumer
//!   queue of byte-blob messages, with push/pop operations that accept
//!   an absolute [`Deadline`].
//!
//! Neither type is internally synchronized except [`AsyncQueue`],
//! which guards all of its state behind one mutex and two condition
//! variables. [`AppendBuffer`] is a plain single-threaded data
//! structure; callers that want to share one across threads pair it
//! with their own `Mutex` and `Condvar` in the same pattern
//! [`AsyncQueue`] uses internally.
//!
//! # Separation of concerns
//!
//! A parser stack typically holds one [`AppendBuffer`] per stage: it
//! reads from the stage's input buffer via [`AppendBuffer::iter`] or
//! [`AppendBuffer::copy_out`], calls [`AppendBuffer::move_head`] to
//! discard what it consumed, and appends whatever it produces to the
//! next stage's buffer. An external-input component (for example
//! something reading from a socket) typically wraps an
//! [`AppendBuffer`] in a `Mutex`, fills it via
//! [`AppendBuffer::get_write_buffer`] and [`WriteBuffer::finish`], and
//! signals a `Condvar` — exactly the pattern [`AsyncQueue`] already
//! implements internally.
//!
//! # Capacity limits
//!
//! [`AsyncQueue`] has a fixed capacity ([`ASYNC_QUEUE_CAPACITY`]).
//! [`AppendBuffer`] has no capacity limit of its own; if a bounded
//! buffer is needed, the glue code enforces that externally (for
//! example by not reading more input than the buffer's
//! [`AppendBuffer::len`] has room for).

#![forbid(unsafe_code)]

mod deadline;
mod error;
mod invariants;
mod piece;
mod queue;

pub mod buffer;

pub use buffer::{AppendBuffer, AppendBufferIterator, DetachedPiece, WriteBuffer};
pub use deadline::Deadline;
pub use error::QueueError;
pub use piece::PIECE_DATA_CAP;
pub use queue::{AsyncQueue, ASYNC_QUEUE_CAPACITY};
