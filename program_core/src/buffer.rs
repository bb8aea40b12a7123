//! Program buffer
//!
//! The token bytes plus the line-break index that is derived from them.
//! [`ProgramBuffer::insert`] and [`ProgramBuffer::remove`] are the only
//! mutators, and each one updates bytes, line starts and the indentation
//! watermark together so nobody outside ever sees them disagree.

use crate::error::CapacityError;
use crate::lines::{LineEntry, LineIndex};
use crate::token::{self, LINEBREAK};

/// Fixed-capacity token buffer with its line index.
#[derive(Debug, Clone)]
pub struct ProgramBuffer<const BUF: usize, const LINES: usize> {
    bytes: [u8; BUF],
    len: usize,
    lines: LineIndex<LINES>,
}

impl<const BUF: usize, const LINES: usize> ProgramBuffer<BUF, LINES> {
    pub fn new() -> Self {
        Self {
            bytes: [0; BUF],
            len: 0,
            lines: LineIndex::new(),
        }
    }

    /// Replace the contents with `program`, rebuilding the line index.
    ///
    /// Nothing changes if the program or its line count does not fit.
    pub fn load(&mut self, program: &[u8]) -> Result<(), CapacityError> {
        if program.len() > BUF {
            return Err(CapacityError::ProgramTooLarge {
                size: program.len(),
                capacity: BUF,
            });
        }
        let breaks = count_breaks(program);
        if breaks > LINES - 1 {
            return Err(CapacityError::LineIndexFull { capacity: LINES });
        }

        self.bytes[..program.len()].copy_from_slice(program);
        self.len = program.len();
        self.lines.rebuild(program, LINEBREAK);
        Ok(())
    }

    pub const fn capacity(&self) -> usize {
        BUF
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes still free.
    pub fn available(&self) -> usize {
        BUF - self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn lines(&self) -> &LineIndex<LINES> {
        &self.lines
    }

    pub fn line_entries(&self) -> &[LineEntry] {
        self.lines.entries()
    }

    /// Size of the token starting at `pos`; the end-of-program slot counts
    /// as 1.
    pub fn token_size(&self, pos: usize) -> usize {
        token::token_size_at(self.as_bytes(), pos)
    }

    /// Start of the token containing `offset`, clamped to the program.
    ///
    /// Walks from the start of the offset's line, which is always a token
    /// start.
    pub fn token_start(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        token::token_start_at_or_before(self.as_bytes(), self.line_start_of(offset), offset)
    }

    /// Start of the token after the token start `pos`.
    pub fn next_token_start(&self, pos: usize) -> usize {
        token::next_token_boundary(self.as_bytes(), pos)
    }

    /// Start of the token before the token start `pos`, or 0.
    pub fn previous_token_start(&self, pos: usize) -> usize {
        let pos = pos.min(self.len);
        let from = self.line_start_of(pos.saturating_sub(1));
        token::previous_token_boundary(self.as_bytes(), from, pos)
    }

    fn line_start_of(&self, offset: usize) -> usize {
        self.lines.start(self.lines.line_of(offset)).unwrap_or(0)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Offset of the first byte of `line`.
    pub fn line_offset(&self, line: usize) -> Option<usize> {
        self.lines.start(line)
    }

    /// Offset of the break ending `line`, or the end of the program for the
    /// last line.
    pub fn line_end(&self, line: usize) -> Option<usize> {
        if line >= self.lines.len() {
            return None;
        }
        Some(match self.lines.start(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        })
    }

    pub fn current_line(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    /// Display indentation of `line`, recomputing stale depths up to it.
    pub fn indentation(&mut self, line: usize) -> u8 {
        let Self { bytes, len, lines } = self;
        lines.indentation(&bytes[..*len], line)
    }

    /// Clamp a nominal removal range to `[0, len)`.
    ///
    /// A negative `at` eats into `count`; a range running past the end is
    /// cut at the end.
    pub fn clamp_range(&self, at: isize, count: usize) -> (usize, usize) {
        let (at, count) = if at < 0 {
            (0, count.saturating_sub(at.unsigned_abs()))
        } else {
            (at as usize, count)
        };
        let at = at.min(self.len);
        let end = at.saturating_add(count).min(self.len);
        (at, end - at)
    }

    /// Insert `tokens` at `at`, shifting the tail right.
    ///
    /// Capacity is checked for both the bytes and the line index before
    /// anything moves.
    pub fn insert(&mut self, at: usize, tokens: &[u8]) -> Result<(), CapacityError> {
        debug_assert!(at <= self.len, "insert at {} past end {}", at, self.len);
        let at = at.min(self.len);
        let count = tokens.len();

        if count > self.available() {
            tracing::warn!(requested = count, available = self.available(), "program buffer full");
            return Err(CapacityError::BufferFull {
                requested: count,
                available: self.available(),
            });
        }
        let breaks = count_breaks(tokens);
        if breaks > self.lines.remaining() {
            tracing::warn!(breaks, capacity = LINES, "line index full");
            return Err(CapacityError::LineIndexFull { capacity: LINES });
        }
        if count == 0 {
            return Ok(());
        }

        let line = self.lines.line_of(at);

        self.bytes.copy_within(at..self.len, at + count);
        self.bytes[at..at + count].copy_from_slice(tokens);
        self.len += count;

        self.lines.shift_right(at, count);
        if breaks > 0 {
            let starts = tokens
                .iter()
                .enumerate()
                .filter(|(_, byte)| **byte == LINEBREAK)
                .map(|(i, _)| at + i + 1);
            self.lines.insert_starts(at, ExactBreaks { inner: starts, left: breaks });
        }
        self.lines.mark_dirty(line);
        Ok(())
    }

    /// Remove `count` bytes at `at`, clamped to the program.
    ///
    /// Always succeeds. Returns the range that was actually removed.
    pub fn remove(&mut self, at: isize, count: usize) -> (usize, usize) {
        let (at, count) = self.clamp_range(at, count);
        if count == 0 {
            return (at, 0);
        }
        let end = at + count;
        let line = self.lines.line_of(at);

        self.lines.remove_breaks_in(at, end);
        self.bytes.copy_within(end..self.len, at);
        self.len -= count;
        self.lines.shift_left(at, count);
        self.lines.mark_dirty(line);
        (at, count)
    }
}

impl<const BUF: usize, const LINES: usize> Default for ProgramBuffer<BUF, LINES> {
    fn default() -> Self {
        Self::new()
    }
}

fn count_breaks(bytes: &[u8]) -> usize {
    bytes.iter().filter(|byte| **byte == LINEBREAK).count()
}

/// Break offsets with a known count.
struct ExactBreaks<I> {
    inner: I,
    left: usize,
}

impl<I: Iterator<Item = usize>> Iterator for ExactBreaks<I> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let next = self.inner.next()?;
        self.left -= 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<I: Iterator<Item = usize>> ExactSizeIterator for ExactBreaks<I> {}
