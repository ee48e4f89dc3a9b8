//! Appendable scatter/gather byte buffer.
//!
//! [`AppendBuffer`] is a FIFO byte buffer built as an ordered sequence
//! of fixed-capacity pieces. It is the buffer that a
//! parser stack repeatedly reads from (trimming its head as it
//! consumes), and that an external-input component fills, typically
//! through [`AppendBuffer::get_write_buffer`] so that a `read()`
//! syscall can write directly into the buffer's storage with no
//! intermediate copy.
//!
//! `AppendBuffer` is not internally synchronized. Share one across
//! threads by wrapping it in a `Mutex`, in the same pattern
//! [`crate::AsyncQueue`] uses for its own state.

use std::collections::VecDeque;

use crate::invariants::{
    debug_assert_drained_means_empty, debug_assert_first_offset_in_range,
    debug_assert_length_zero_iff_drained,
};
use crate::piece::{Piece, PIECE_DATA_CAP};

/// An appendable scatter/gather byte buffer.
///
/// See the [module docs](self) for the full contract. In short:
///
/// - [`AppendBuffer::append`] and [`AppendBuffer::get_write_buffer`] add
///   data at the tail.
/// - [`AppendBuffer::copy_out`] and [`AppendBuffer::iter`] read data
///   without mutating the buffer.
/// - [`AppendBuffer::move_head`] discards a byte prefix, freeing
///   pieces that become unreachable.
#[derive(Default)]
pub struct AppendBuffer {
    pieces: VecDeque<Piece>,
    /// Bytes at the head of `pieces[0]` that are logically trimmed off.
    first_offset: usize,
    /// Total live bytes: `sum(piece.used_len()) - first_offset`.
    length: usize,
}

impl Clone for AppendBuffer {
    /// Deep-copies every piece in order, preserving `used_len`,
    /// `first_offset` and `length`.
    ///
    /// Allocation failure here means the process aborts (the same
    /// guarantee `Vec::clone` gives), so there is no reachable
    /// partially-cloned state to document or test.
    fn clone(&self) -> Self {
        AppendBuffer {
            pieces: self.pieces.clone(),
            first_offset: self.first_offset,
            length: self.length,
        }
    }
}

impl AppendBuffer {
    /// Creates a new, empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of live bytes currently held.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// True if there are no live bytes held.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Resets the buffer to empty, dropping every piece.
    #[inline]
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.first_offset = 0;
        self.length = 0;
    }

    /// Takes the contents of this buffer, leaving it empty, and
    /// returns the taken contents as a new buffer. O(1): only the
    /// piece list and two scalars move: no piece is copied.
    #[inline]
    pub fn take(&mut self) -> AppendBuffer {
        std::mem::take(self)
    }

    /// Appends all of `data` to the tail of the buffer, filling the
    /// last piece's free tail first and allocating new pieces of
    /// [`crate::PIECE_DATA_CAP`] capacity as needed. Returns the
    /// number of bytes appended (always `data.len()`; allocation
    /// failure is not representable as a short count in safe Rust —
    /// see this type's `Clone` impl for the same reasoning).
    pub fn append(&mut self, data: &[u8]) -> usize {
        let mut written = 0;

        if let Some(piece) = self.pieces.back_mut() {
            let free = piece.free_len();
            if free > 0 {
                let n = free.min(data.len());
                let used = piece.used_len();
                piece.full_mut()[used..used + n].copy_from_slice(&data[..n]);
                piece.set_used_len(used + n);
                written += n;
            }
        }

        while written < data.len() {
            let mut piece = Piece::new();
            let n = (data.len() - written).min(PIECE_DATA_CAP);
            piece.full_mut()[..n].copy_from_slice(&data[written..written + n]);
            piece.set_used_len(n);
            self.pieces.push_back(piece);
            written += n;
        }

        self.length += written;
        self.check_invariants();
        written
    }

    /// Copies at most `out.len()` bytes starting at logical `offset`
    /// into `out`. Returns the number of bytes actually copied: short
    /// if `offset + out.len()` exceeds [`AppendBuffer::len`], zero if
    /// `offset >= len()`. Never mutates the buffer.
    pub fn copy_out(&self, offset: usize, out: &mut [u8]) -> usize {
        if offset >= self.length || out.is_empty() {
            return 0;
        }
        let want = out.len().min(self.length - offset);
        let mut skip = offset + self.first_offset;
        let mut written = 0;

        for piece in self.pieces.iter() {
            let used = piece.used_len();
            if skip >= used {
                skip -= used;
                continue;
            }
            let avail = used - skip;
            let n = avail.min(want - written);
            out[written..written + n].copy_from_slice(&piece.used()[skip..skip + n]);
            written += n;
            skip = 0;
            if written >= want {
                break;
            }
        }
        written
    }

    /// Advances the logical head by `add` bytes, freeing every piece
    /// that becomes fully consumed.
    ///
    /// - `add == len()`: frees the entire buffer, returns `true`.
    /// - `add > len()`: frees the entire buffer (destructive), returns
    ///   `false`: the caller's request was invalid, but the buffer is
    ///   cleared anyway rather than left in an ambiguous
    ///   partially-trimmed state.
    /// - `add < len()`: walks pieces from the front, dropping every
    ///   piece that becomes fully consumed, and leaves `first_offset`
    ///   pointing at the new head within the surviving first piece.
    pub fn move_head(&mut self, add: usize) -> bool {
        if add == self.length {
            self.clear();
            return true;
        }
        if add > self.length {
            self.clear();
            return false;
        }

        let mut remaining = add + self.first_offset;
        while let Some(front) = self.pieces.front() {
            let used = front.used_len();
            if remaining < used {
                self.first_offset = remaining;
                break;
            }
            remaining -= used;
            self.pieces.pop_front();
        }
        self.length -= add;
        self.check_invariants();
        true
    }

    /// Returns a mutable slice over the unused tail of the last
    /// piece, or an empty slice if the buffer is empty or the last
    /// piece is full.
    ///
    /// Pairs with [`AppendBuffer::move_end`]: write into the returned
    /// slice, then call `move_end` with however many bytes were
    /// actually written, before any other call that might restructure
    /// the buffer.
    pub fn get_end_free(&mut self) -> &mut [u8] {
        match self.pieces.back_mut() {
            Some(piece) if piece.free_len() > 0 => piece.free_tail_mut(),
            _ => &mut [],
        }
    }

    /// Extends `len()` by `add` into the tail free region of the last
    /// piece, previously filled via [`AppendBuffer::get_end_free`].
    /// Fails (`false`) if `add` exceeds the last piece's free space or
    /// the buffer is empty; does not itself write any bytes.
    pub fn move_end(&mut self, add: usize) -> bool {
        let ok = match self.pieces.back_mut() {
            Some(piece) if piece.free_len() >= add => {
                let new_used = piece.used_len() + add;
                piece.set_used_len(new_used);
                true
            }
            _ => false,
        };
        if ok {
            self.length += add;
            self.check_invariants();
        }
        ok
    }

    /// Allocates a piece not yet attached to any buffer. Fill it via
    /// [`DetachedPiece::as_mut_slice`], then attach it with
    /// [`AppendBuffer::append_piece`] or discard it by dropping it.
    #[inline]
    pub fn new_detached_piece() -> DetachedPiece {
        DetachedPiece(Piece::new())
    }

    /// Attaches a caller-owned detached piece at the tail, taking
    /// ownership.
    ///
    /// **Precondition**: the last piece (if any) must have zero free
    /// tail. If it does not, returns `Err(piece)`, handing the piece
    /// straight back to the caller rather than dropping it.
    pub fn append_piece(&mut self, piece: DetachedPiece, used: usize) -> Result<(), DetachedPiece> {
        let last_free = self.pieces.back().map_or(0, |p| p.free_len());
        if last_free > 0 {
            return Err(piece);
        }
        debug_assert!(used <= PIECE_DATA_CAP);

        // Attaching a zero-length piece to an already-empty buffer
        // would leave a non-empty piece list with `length == 0`,
        // breaking the eager-free invariant. It contributes nothing,
        // so just drop it instead of pushing it.
        if used == 0 && self.length == 0 {
            return Ok(());
        }

        let mut inner = piece.0;
        inner.set_used_len(used);
        self.pieces.push_back(inner);
        self.length += used;
        self.check_invariants();
        Ok(())
    }

    /// Returns a write guard for direct zero-copy filling: either the
    /// unused tail of the last piece (if any is free), or a freshly
    /// allocated detached piece. Write into it via
    /// [`WriteBuffer::as_mut_slice`], then call
    /// [`WriteBuffer::finish`] to commit however many bytes were
    /// written.
    pub fn get_write_buffer(&mut self) -> WriteBuffer<'_> {
        let last_free = self.pieces.back().map_or(0, |p| p.free_len());
        if last_free > 0 {
            WriteBuffer::Tail(self)
        } else {
            WriteBuffer::Detached(self, DetachedPiece(Piece::new()))
        }
    }

    /// Positions an iterator at the first live byte. If the buffer is
    /// empty, the returned iterator is immediately exhausted.
    pub fn iter(&self) -> AppendBufferIterator<'_> {
        let mut it = if self.length == 0 {
            AppendBufferIterator {
                buf: self,
                piece_idx: self.pieces.len(),
                raw_off: 0,
                pos: 0,
            }
        } else {
            AppendBufferIterator {
                buf: self,
                piece_idx: 0,
                raw_off: self.first_offset,
                pos: 0,
            }
        };
        it.skip_empty_pieces();
        it
    }

    fn check_invariants(&self) {
        debug_assert_length_zero_iff_drained!(self.length, self.pieces, self.first_offset);
        debug_assert_drained_means_empty!(self.length, self.pieces);
        debug_assert_first_offset_in_range!(self.length, self.pieces, self.first_offset);
    }
}

/// A piece allocated but not yet attached to any [`AppendBuffer`].
///
/// Obtained from [`AppendBuffer::new_detached_piece`] or
/// [`AppendBuffer::get_write_buffer`]. Fill it via
/// [`DetachedPiece::as_mut_slice`], then attach it with
/// [`AppendBuffer::append_piece`]. Dropping it without attaching
/// simply frees it.
pub struct DetachedPiece(Piece);

impl DetachedPiece {
    /// A mutable slice over the piece's full [`crate::PIECE_DATA_CAP`]-byte
    /// capacity, for the caller to fill before attaching.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.0.full_mut()
    }
}

/// A write guard returned by [`AppendBuffer::get_write_buffer`].
///
/// Either borrows the existing free tail of the buffer's last piece
/// (`Tail`), or owns a freshly allocated piece not yet attached
/// (`Detached`). Write into it via [`WriteBuffer::as_mut_slice`], then
/// call [`WriteBuffer::finish`] to commit.
pub enum WriteBuffer<'a> {
    /// Borrows the unused tail of the buffer's existing last piece.
    Tail(&'a mut AppendBuffer),
    /// Owns a freshly allocated piece not yet attached to the buffer.
    Detached(&'a mut AppendBuffer, DetachedPiece),
}

impl<'a> WriteBuffer<'a> {
    /// A mutable slice to write into: the buffer's existing free tail
    /// for `Tail`, or the fresh piece's full capacity for `Detached`.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            WriteBuffer::Tail(buf) => buf.get_end_free(),
            WriteBuffer::Detached(_, piece) => piece.as_mut_slice(),
        }
    }

    /// Commits `used` bytes written via [`WriteBuffer::as_mut_slice`].
    /// For `Tail` this calls [`AppendBuffer::move_end`]; for
    /// `Detached` this calls [`AppendBuffer::append_piece`] (whose
    /// precondition always holds here, since the piece was just
    /// freshly allocated with an empty last piece already full).
    pub fn finish(self, used: usize) -> bool {
        match self {
            WriteBuffer::Tail(buf) => buf.move_end(used),
            WriteBuffer::Detached(buf, piece) => buf.append_piece(piece, used).is_ok(),
        }
    }
}

/// A forward-only byte iterator over an [`AppendBuffer`]'s live bytes.
///
/// Created by [`AppendBuffer::iter`]; borrows the buffer for its
/// lifetime, so the borrow checker (rather than a documented
/// "undefined behaviour if mutated concurrently" contract) rejects any
/// attempt to structurally mutate the buffer while the iterator is
/// alive.
pub struct AppendBufferIterator<'a> {
    buf: &'a AppendBuffer,
    piece_idx: usize,
    raw_off: usize,
    pos: usize,
}

impl<'a> AppendBufferIterator<'a> {
    /// True once the iterator has yielded every live byte.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.piece_idx >= self.buf.pieces.len()
    }

    /// The absolute logical position of the next byte to be yielded
    /// (0-based from the start of the buffer's live data).
    #[inline(always)]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Advances by `k` bytes without yielding them. Fast path when the
    /// result stays within the current piece; slow path walks the
    /// piece list. If the end is crossed, the iterator becomes
    /// exhausted and [`AppendBufferIterator::pos`] stops at the total
    /// number of bytes available (at most the buffer's `len()`).
    pub fn advance(&mut self, mut k: usize) {
        self.skip_empty_pieces();
        while k > 0 && !self.is_done() {
            let piece = &self.buf.pieces[self.piece_idx];
            let remaining_in_piece = piece.used_len() - self.raw_off;
            if k < remaining_in_piece {
                self.raw_off += k;
                self.pos += k;
                k = 0;
            } else {
                self.pos += remaining_in_piece;
                k -= remaining_in_piece;
                self.piece_idx += 1;
                self.raw_off = 0;
                self.skip_empty_pieces();
            }
        }
    }

    /// A piece attached via [`AppendBuffer::append_piece`] may have
    /// zero used bytes (e.g. `finish(0)` on a [`WriteBuffer`]). Rests
    /// the cursor past any such piece so that `is_done()` and `next()`
    /// never look at a piece with nothing left to read at the current
    /// offset.
    fn skip_empty_pieces(&mut self) {
        while !self.is_done() && self.buf.pieces[self.piece_idx].used_len() == self.raw_off {
            self.piece_idx += 1;
            self.raw_off = 0;
        }
    }
}

impl<'a> Iterator for AppendBufferIterator<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.is_done() {
            return None;
        }
        let byte = self.buf.pieces[self.piece_idx].used()[self.raw_off];
        self.advance(1);
        Some(byte)
    }
}
