//! Indentation cache
//!
//! Block depth is derived from the first and last token of each line:
//! `While`, `Repeat`, `For(`, `Then` and `Else` open a block for the lines
//! that follow, and a line starting with `End` or `Else` closes one. The
//! depth stored on a line entry is the nesting level at the start of that
//! line, so it only depends on earlier lines and an edit never invalidates
//! anything at or before the edited line.
//!
//! Recomputation is lazy: [`LineIndex::dirty_from`] marks the lowest stale
//! line and a query only walks forward as far as the line it asks about.

use crate::lines::LineIndex;
use crate::token::{self, COLON, ELSE, END, FOR, LINEBREAK, REPEAT, SPACE, THEN, WHILE};

/// Block effect of one line's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineShape {
    /// Closes the enclosing block (`End`, `Else`)
    pub closes: bool,
    /// Opens a block for the following lines
    pub opens: bool,
}

/// Classify the content `bytes[start..end)` of one line.
pub fn line_shape(bytes: &[u8], start: usize, end: usize) -> LineShape {
    let end = end.min(bytes.len());
    if start >= end {
        return LineShape::default();
    }
    let content = &bytes[start..end];

    let mut first = None;
    let mut last = None;
    for (offset, size) in token::token_starts(content) {
        let byte = content[offset];
        if size == 1 && (byte == SPACE || byte == COLON) {
            continue;
        }
        if first.is_none() {
            first = Some(byte);
        }
        last = Some(byte);
    }

    let Some(first) = first else {
        return LineShape::default();
    };
    LineShape {
        closes: matches!(first, END | ELSE),
        opens: matches!(first, WHILE | REPEAT | FOR | THEN | ELSE) || last == Some(THEN),
    }
}

/// Nesting level after a line that starts at `depth`.
pub fn depth_after(depth: u8, shape: LineShape) -> u8 {
    let mut depth = depth;
    if shape.closes {
        depth = depth.saturating_sub(1);
    }
    if shape.opens {
        depth = depth.saturating_add(1);
    }
    depth
}

/// Offset one past the last content byte of `line`.
fn content_end<const N: usize>(lines: &LineIndex<N>, bytes: &[u8], line: usize) -> usize {
    match lines.start(line + 1) {
        Some(next) => next - 1,
        None => bytes.len(),
    }
}

impl<const N: usize> LineIndex<N> {
    /// Bring cached depths up to date through `line` (inclusive).
    ///
    /// Walks forward from `dirty_from - 1`, never past `line`.
    pub fn refresh_depths(&mut self, bytes: &[u8], line: usize) {
        let line = line.min(self.len() - 1);
        let from = self.dirty_from().max(1);
        if from > line {
            return;
        }

        let mut depth = self.entries()[from - 1].depth;
        for current in from..=line {
            let previous = current - 1;
            let start = self.entries()[previous].start;
            let end = content_end(self, bytes, previous);
            debug_assert!(
                end >= bytes.len() || bytes[end] == LINEBREAK,
                "line {} not terminated by a break",
                previous
            );
            depth = depth_after(depth, line_shape(bytes, start, end));
            self.entries_mut()[current].depth = depth;
        }
        self.set_dirty_from(line + 1);
    }

    /// Display indentation of `line`, refreshing the cache up to it.
    ///
    /// A line that closes a block sits at the level of its opener.
    pub fn indentation(&mut self, bytes: &[u8], line: usize) -> u8 {
        if line >= self.len() {
            return 0;
        }
        self.refresh_depths(bytes, line);
        let start = self.entries()[line].start;
        let end = content_end(self, bytes, line);
        let depth = self.entries()[line].depth;
        if line_shape(bytes, start, end).closes {
            depth.saturating_sub(1)
        } else {
            depth
        }
    }
}
