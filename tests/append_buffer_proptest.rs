//! Property tests checking `AppendBuffer`'s core invariants hold for
//! arbitrary sequences of appends, head-trims and reads.

use pieceq::AppendBuffer;
use proptest::prelude::*;

proptest! {
    /// Appending any sequence of chunks, then draining with the
    /// iterator, reproduces exactly the concatenation of those
    /// chunks, however they straddle piece boundaries.
    #[test]
    fn append_then_iterate_reproduces_the_input(chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..300), 0..20)) {
        let mut buf = AppendBuffer::new();
        let mut expected = Vec::new();
        for chunk in &chunks {
            buf.append(chunk);
            expected.extend_from_slice(chunk);
        }
        let actual: Vec<u8> = buf.iter().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(buf.len(), buf.iter().count());
    }

    /// `copy_out` at any offset returns exactly the corresponding
    /// slice of the logical contents, truncated if it runs past the
    /// end, empty if the offset is out of range.
    #[test]
    fn copy_out_matches_a_slice_of_the_logical_contents(
        data in proptest::collection::vec(any::<u8>(), 0..500),
        offset in 0usize..600,
        want in 0usize..50,
    ) {
        let mut buf = AppendBuffer::new();
        buf.append(&data);

        let mut out = vec![0xAAu8; want];
        let n = buf.copy_out(offset, &mut out);

        let expected_n = if offset >= data.len() {
            0
        } else {
            want.min(data.len() - offset)
        };
        prop_assert_eq!(n, expected_n);
        prop_assert_eq!(&out[..n], &data[offset..offset + n]);
    }

    /// Repeatedly trimming the head by arbitrary amounts (each at most
    /// the current length) always leaves the buffer holding exactly
    /// the corresponding suffix, and never panics.
    #[test]
    fn move_head_sequence_leaves_the_expected_suffix(
        data in proptest::collection::vec(any::<u8>(), 1..500),
        trims in proptest::collection::vec(1usize..40, 0..15),
    ) {
        let mut buf = AppendBuffer::new();
        buf.append(&data);
        let mut consumed = 0usize;

        for trim in trims {
            if consumed >= data.len() {
                break;
            }
            let trim = trim.min(data.len() - consumed);
            prop_assert!(buf.move_head(trim));
            consumed += trim;
            let actual: Vec<u8> = buf.iter().collect();
            prop_assert_eq!(actual, &data[consumed..]);
        }
    }

    /// A `move_head` for more bytes than are present always drains
    /// the buffer (the destructive-but-total contract), regardless of
    /// how much data was appended.
    #[test]
    fn move_head_past_the_end_always_drains(
        data in proptest::collection::vec(any::<u8>(), 0..500),
        extra in 1usize..1000,
    ) {
        let mut buf = AppendBuffer::new();
        buf.append(&data);
        let requested = data.len() + extra;
        prop_assert!(!buf.move_head(requested));
        prop_assert_eq!(buf.len(), 0);
        prop_assert!(buf.iter().is_done());
    }

    /// Cloning at any point in a buffer's life yields a buffer whose
    /// logical contents are identical, and the two are independent of
    /// further mutation.
    #[test]
    fn clone_preserves_contents_and_independence(
        data in proptest::collection::vec(any::<u8>(), 0..500),
        head_trim in 0usize..500,
        extra in proptest::collection::vec(any::<u8>(), 0..100),
    ) {
        let mut buf = AppendBuffer::new();
        buf.append(&data);
        let trim = head_trim.min(buf.len());
        buf.move_head(trim);

        let mut cloned = buf.clone();
        prop_assert!(buf.iter().eq(cloned.iter()));

        cloned.append(&extra);
        prop_assert_eq!(buf.len() + extra.len(), cloned.len());
    }
}
