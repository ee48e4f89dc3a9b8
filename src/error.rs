use thiserror::Error;

/// Errors returned by [`crate::AsyncQueue`] operations.
///
/// `AppendBuffer`'s narrower precondition failures are not represented
/// here — they are few enough and local enough to stay as `bool` or
/// `Result<(), DetachedPiece>` returns (see the buffer's own method
/// docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The operation's deadline elapsed before it could complete.
    #[error("deadline elapsed before the queue operation completed")]
    TimedOut,

    /// The message could not be copied into the queue because memory
    /// allocation failed.
    #[error("out of memory while allocating queue message")]
    OutOfMemory,
}
