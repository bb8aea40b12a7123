//! Line-break index
//!
//! Fixed-capacity, strictly increasing list of line starts. Entry 0 is the
//! synthetic "start of document" entry and is never removed; every other
//! entry belongs to exactly one line-break byte in the program and stores the
//! offset just past it (the first byte of the line that break opens).
//!
//! Each entry also caches the block nesting depth at the start of its line,
//! see [`crate::indent`].

/// One line of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineEntry {
    /// Offset of the first byte of the line
    pub start: usize,
    /// Cached nesting depth at the start of the line
    pub depth: u8,
}

/// Line-break index with a fixed number of slots.
#[derive(Debug, Clone)]
pub struct LineIndex<const N: usize> {
    entries: [LineEntry; N],
    count: usize,
    /// Lowest line whose cached depth is stale
    dirty_from: usize,
}

impl<const N: usize> LineIndex<N> {
    pub fn new() -> Self {
        assert!(N >= 1, "line index needs room for the start-of-document entry");
        Self {
            entries: [LineEntry::default(); N],
            count: 1,
            dirty_from: 1,
        }
    }

    /// Drop every real entry, keeping the start-of-document entry.
    pub fn reset(&mut self) {
        self.entries[0] = LineEntry::default();
        self.count = 1;
        self.dirty_from = 1;
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of lines (synthetic entry included, so never 0).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Slots still free for new line breaks.
    pub fn remaining(&self) -> usize {
        N - self.count
    }

    pub fn entries(&self) -> &[LineEntry] {
        &self.entries[..self.count]
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [LineEntry] {
        &mut self.entries[..self.count]
    }

    /// Start offset of `line`.
    pub fn start(&self, line: usize) -> Option<usize> {
        self.entries().get(line).map(|entry| entry.start)
    }

    /// Line containing `offset`.
    ///
    /// A line-break byte belongs to the line it terminates.
    pub fn line_of(&self, offset: usize) -> usize {
        let after = self.entries().partition_point(|entry| entry.start <= offset);
        debug_assert!(after >= 1, "start-of-document entry must cover offset 0");
        after.saturating_sub(1)
    }

    pub fn dirty_from(&self) -> usize {
        self.dirty_from
    }

    pub(crate) fn set_dirty_from(&mut self, line: usize) {
        self.dirty_from = line;
    }

    /// Note that the content of `line` changed. Only lines after it can
    /// have a different starting depth.
    pub(crate) fn mark_dirty(&mut self, line: usize) {
        self.dirty_from = self.dirty_from.min(line + 1);
    }

    /// Add `by` to every line start past `at`.
    ///
    /// Walks backward from the end and stops at the first entry that is not
    /// moved; edits cluster near the cursor, so this usually touches a few
    /// entries at the tail.
    pub(crate) fn shift_right(&mut self, at: usize, by: usize) {
        for entry in self.entries_mut().iter_mut().rev() {
            if entry.start > at {
                entry.start += by;
            } else {
                break;
            }
        }
    }

    /// Subtract `by` from every line start past `at`.
    pub(crate) fn shift_left(&mut self, at: usize, by: usize) {
        for entry in self.entries_mut().iter_mut().rev() {
            if entry.start > at {
                debug_assert!(entry.start >= by + at, "line start shifted before edit");
                entry.start -= by;
            } else {
                break;
            }
        }
    }

    /// Insert new line starts, all greater than `at`, in ascending order.
    ///
    /// The caller has already checked `starts.len() <= self.remaining()`.
    pub(crate) fn insert_starts(&mut self, at: usize, starts: impl ExactSizeIterator<Item = usize>) {
        let added = starts.len();
        if added == 0 {
            return;
        }
        debug_assert!(added <= self.remaining());

        // Slot after the last entry at or before `at`
        let mut slot = 1;
        for i in (0..self.count).rev() {
            if self.entries[i].start <= at {
                slot = i + 1;
                break;
            }
        }

        self.entries.copy_within(slot..self.count, slot + added);
        for (i, start) in starts.enumerate() {
            self.entries[slot + i] = LineEntry { start, depth: 0 };
        }
        self.count += added;
    }

    /// Drop the entries whose line-break byte lies in `[at, end)`.
    ///
    /// Returns how many entries were removed.
    pub(crate) fn remove_breaks_in(&mut self, at: usize, end: usize) -> usize {
        let entries = self.entries();
        let first = entries.partition_point(|entry| entry.start <= at);
        let last = entries.partition_point(|entry| entry.start <= end);
        let removed = last - first;
        if removed > 0 {
            self.entries.copy_within(last..self.count, first);
            self.count -= removed;
        }
        removed
    }

    /// Rebuild from scratch for `bytes`.
    ///
    /// The caller has already checked the break count fits.
    pub(crate) fn rebuild(&mut self, bytes: &[u8], linebreak: u8) {
        self.reset();
        for (i, _) in bytes.iter().enumerate().filter(|(_, b)| **b == linebreak) {
            self.entries[self.count] = LineEntry {
                start: i + 1,
                depth: 0,
            };
            self.count += 1;
        }
    }
}

impl<const N: usize> Default for LineIndex<N> {
    fn default() -> Self {
        Self::new()
    }
}
