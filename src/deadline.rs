use std::time::{Duration, Instant};

/// An absolute point in time at which a blocking [`crate::AsyncQueue`]
/// operation should give up waiting.
///
/// `Deadline::At` wraps a monotonic [`Instant`] rather than a
/// wall-clock timestamp, which avoids the class of bugs where a
/// timeout fires early or late because the system clock was adjusted
/// mid-wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// No timeout: wait indefinitely. Used by `push`/`pop`.
    Never,
    /// Give up waiting once this instant has passed.
    At(Instant),
}

impl Deadline {
    /// A deadline that has already passed, i.e. "try once, don't
    /// wait". Used by `try_push`/`try_pop`.
    #[inline]
    pub fn expired() -> Self {
        Deadline::At(Instant::now())
    }

    /// A deadline `dur` from now.
    #[inline]
    pub fn now_plus(dur: Duration) -> Self {
        Deadline::At(Instant::now() + dur)
    }

    /// The `Duration` remaining until this deadline, or `None` for
    /// [`Deadline::Never`]. Returns `Some(Duration::ZERO)` (never
    /// negative) once the deadline has passed.
    #[inline]
    pub(crate) fn remaining(&self) -> Option<Duration> {
        match self {
            Deadline::Never => None,
            Deadline::At(instant) => Some(instant.saturating_duration_since(Instant::now())),
        }
    }

    /// True if this deadline has already passed (or is
    /// [`Deadline::expired`]'s "now" instant, which by the time it is
    /// checked has always just passed).
    #[inline]
    pub(crate) fn has_passed(&self) -> bool {
        matches!(self, Deadline::At(instant) if *instant <= Instant::now())
    }
}
