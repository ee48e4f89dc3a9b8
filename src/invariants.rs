//! Debug assertion helpers for the structural invariants of
//! [`crate::AppendBuffer`] and [`crate::AsyncQueue`].
//!
//! These are only active in debug builds (`debug_assert!`), so there
//! is zero overhead in release builds. Used by [`crate::AppendBuffer`]
//! after every structural mutation and by [`crate::AsyncQueue`] after
//! every push/pop.

/// `length == 0` iff the piece list is empty, or a single piece
/// remains with `used_len == first_offset`.
macro_rules! debug_assert_length_zero_iff_drained {
    ($length:expr, $pieces:expr, $first_offset:expr) => {
        debug_assert!(
            ($length != 0) || $pieces.is_empty() || {
                $pieces.len() == 1 && $pieces[0].used_len() == $first_offset
            },
            "length is {} but piece list is not drained",
            $length
        )
    };
}

/// Eager-free half of the above: once `length` reaches zero the piece
/// list must actually be empty, never left around with drained
/// pieces.
macro_rules! debug_assert_drained_means_empty {
    ($length:expr, $pieces:expr) => {
        debug_assert!(
            $length != 0 || $pieces.is_empty(),
            "length is 0 but {} pieces were not freed",
            $pieces.len()
        )
    };
}

/// `first_offset < first_piece.used_len` whenever a first piece
/// exists and `length > 0`.
macro_rules! debug_assert_first_offset_in_range {
    ($length:expr, $pieces:expr, $first_offset:expr) => {
        debug_assert!(
            $length == 0 || $pieces.is_empty() || $first_offset < $pieces[0].used_len(),
            "first_offset {} not less than first piece's used_len {}",
            $first_offset,
            $pieces[0].used_len()
        )
    };
}

/// Bounded count: an `AsyncQueue`'s pending message count never
/// exceeds its compile-time capacity.
macro_rules! debug_assert_queue_bounded {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "async queue bound violated: {} pending messages exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

pub(crate) use debug_assert_drained_means_empty;
pub(crate) use debug_assert_first_offset_in_range;
pub(crate) use debug_assert_length_zero_iff_drained;
pub(crate) use debug_assert_queue_bounded;
