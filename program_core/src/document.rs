//! Document: program buffer, cursor, selection anchor and undo/redo logs
//!
//! Every edit from the editing layer goes through [`Document::insert_tokens`]
//! or [`Document::remove_tokens`], which record a delta in the undo log and
//! forget the redo future. Undo and redo are the same replay with the two
//! logs swapped: the inverse of the popped record is applied and recorded in
//! the other log, so every undo can be redone and vice versa.

use crate::buffer::ProgramBuffer;
use crate::delta::{Delta, DeltaLog};
use crate::error::CapacityError;
use crate::lines::LineEntry;
use crate::selection::{self, SelectionRange};

/// Default program capacity in bytes
pub const PROGRAM_CAPACITY: usize = 32768;
/// Default number of line-index entries
pub const LINE_CAPACITY: usize = 1600;
/// Default byte budget of each delta log
pub const DELTA_LOG_CAPACITY: usize = 4096;

/// Editable tokenized program.
#[derive(Debug, Clone)]
pub struct Document<
    const BUF: usize = PROGRAM_CAPACITY,
    const LINES: usize = LINE_CAPACITY,
    const LOG: usize = DELTA_LOG_CAPACITY,
> {
    program: ProgramBuffer<BUF, LINES>,
    cursor: usize,
    anchor: Option<usize>,
    undo_log: DeltaLog<LOG>,
    redo_log: DeltaLog<LOG>,
    dirty: bool,
}

impl<const BUF: usize, const LINES: usize, const LOG: usize> Document<BUF, LINES, LOG> {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            program: ProgramBuffer::new(),
            cursor: 0,
            anchor: None,
            undo_log: DeltaLog::new(),
            redo_log: DeltaLog::new(),
            dirty: false,
        }
    }

    /// Create a document holding `program`
    pub fn from_bytes(program: &[u8]) -> Result<Self, CapacityError> {
        let mut document = Self::new();
        document.load(program)?;
        Ok(document)
    }

    /// Replace the whole program. History, cursor and selection start over.
    pub fn load(&mut self, program: &[u8]) -> Result<(), CapacityError> {
        self.program.load(program)?;
        self.cursor = 0;
        self.anchor = None;
        self.undo_log.clear();
        self.redo_log.clear();
        self.dirty = false;
        Ok(())
    }

    // Accessors

    pub fn as_bytes(&self) -> &[u8] {
        self.program.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.program.capacity()
    }

    pub fn program(&self) -> &ProgramBuffer<BUF, LINES> {
        &self.program
    }

    pub fn line_entries(&self) -> &[LineEntry] {
        self.program.line_entries()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to the program and snapped back onto the
    /// start of the token it lands in.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = self.snap(offset);
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<usize>) {
        self.anchor = anchor.map(|offset| self.snap(offset));
    }

    pub fn is_selecting(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_log.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_log.len()
    }

    pub fn undo_log(&self) -> &DeltaLog<LOG> {
        &self.undo_log
    }

    pub fn redo_log(&self) -> &DeltaLog<LOG> {
        &self.redo_log
    }

    // Queries

    /// Size of the token starting at `pos`; the end-of-program slot counts
    /// as 1.
    pub fn token_size(&self, pos: usize) -> usize {
        self.program.token_size(pos)
    }

    /// Start of the token after the token start `pos`
    pub fn next_token_start(&self, pos: usize) -> usize {
        self.program.next_token_start(pos)
    }

    /// Start of the token before the token start `pos`, or 0
    pub fn previous_token_start(&self, pos: usize) -> usize {
        self.program.previous_token_start(pos)
    }

    /// Line containing `offset`
    pub fn current_line(&self, offset: usize) -> usize {
        self.program.current_line(offset)
    }

    /// Line containing the cursor
    pub fn cursor_line(&self) -> usize {
        self.program.current_line(self.cursor)
    }

    pub fn selecting_range(&self, cursor: usize, anchor: usize) -> SelectionRange {
        selection::selecting_range(self.as_bytes(), cursor, anchor)
    }

    /// Range between the cursor and the anchor, if a selection is active.
    pub fn selection(&self) -> Option<SelectionRange> {
        self.anchor
            .map(|anchor| self.selecting_range(self.cursor, anchor))
    }

    /// Bytes covered by `range`, cut at the end of the program.
    pub fn slice_range(&self, range: SelectionRange) -> &[u8] {
        let bytes = self.as_bytes();
        let min = range.min.min(bytes.len());
        let end = range.max.saturating_add(1).min(bytes.len());
        &bytes[min..end.max(min)]
    }

    pub fn line_count(&self) -> usize {
        self.program.line_count()
    }

    /// Offset of the first byte of `line`
    pub fn line_offset(&self, line: usize) -> Option<usize> {
        self.program.line_offset(line)
    }

    /// Offset of the break ending `line`, or the end of the program
    pub fn line_end(&self, line: usize) -> Option<usize> {
        self.program.line_end(line)
    }

    /// Indentation of `line`. Recomputes stale cache entries up to it.
    pub fn indentation(&mut self, line: usize) -> u8 {
        self.program.indentation(line)
    }

    // Edits

    /// Insert `tokens` at `at` and record the edit for undo.
    ///
    /// The cursor does not move; callers that mean "insert and advance" move
    /// it themselves.
    pub fn insert_tokens(&mut self, at: usize, tokens: &[u8]) -> Result<(), CapacityError> {
        let cursor_was = self.cursor;
        let at = at.min(self.len());
        self.program.insert(at, tokens)?;
        if tokens.is_empty() {
            return Ok(());
        }
        self.undo_log.push(&Delta::Insert {
            at,
            count: tokens.len(),
            cursor_was,
        });
        self.redo_log.clear();
        self.after_edit();
        Ok(())
    }

    /// Remove `count` bytes at `at` and record the edit for undo.
    ///
    /// The range is clamped to the program, so any nominal range is fine.
    /// Returns the range actually removed.
    pub fn remove_tokens(&mut self, at: isize, count: usize) -> (usize, usize) {
        let (at, count) = self.program.clamp_range(at, count);
        if count == 0 {
            return (at, 0);
        }
        self.undo_log.push(&Delta::Remove {
            at,
            cursor_was: self.cursor,
            payload: &self.program.as_bytes()[at..at + count],
        });
        self.program.remove(at as isize, count);
        self.redo_log.clear();
        self.after_edit();
        (at, count)
    }

    /// Revert the newest edit. Returns the restored cursor, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<usize> {
        let cursor = self.cursor;
        let delta = self.undo_log.pop()?;
        tracing::debug!(kind = ?delta.kind(), at = delta.at(), count = delta.count(), "undo");
        let restored = apply_inverse(&mut self.program, &mut self.redo_log, cursor, &delta);
        self.finish_replay(restored)
    }

    /// Reapply the newest undone edit.
    pub fn redo(&mut self) -> Option<usize> {
        let cursor = self.cursor;
        let delta = self.redo_log.pop()?;
        tracing::debug!(kind = ?delta.kind(), at = delta.at(), count = delta.count(), "redo");
        let restored = apply_inverse(&mut self.program, &mut self.undo_log, cursor, &delta);
        self.finish_replay(restored)
    }

    fn finish_replay(&mut self, restored: Option<usize>) -> Option<usize> {
        let cursor = restored?;
        self.cursor = cursor;
        self.after_edit();
        Some(self.cursor)
    }

    fn after_edit(&mut self) {
        self.dirty = true;
        self.cursor = self.snap(self.cursor);
        if let Some(anchor) = self.anchor {
            self.anchor = Some(self.snap(anchor));
        }
    }

    fn snap(&self, offset: usize) -> usize {
        self.program.token_start(offset)
    }
}

/// Apply the inverse of `delta` to `program`, recording it in `log`.
///
/// Returns the cursor the edit was made from, or `None` if the program could
/// not take the bytes back.
fn apply_inverse<const BUF: usize, const LINES: usize, const LOG: usize>(
    program: &mut ProgramBuffer<BUF, LINES>,
    log: &mut DeltaLog<LOG>,
    cursor: usize,
    delta: &Delta<'_>,
) -> Option<usize> {
    match *delta {
        Delta::Insert { at, count, .. } => {
            let (at, count) = program.clamp_range(at as isize, count);
            debug_assert_eq!(count, delta.count(), "undo range ran past the program");
            log.push(&Delta::Remove {
                at,
                cursor_was: cursor,
                payload: &program.as_bytes()[at..at + count],
            });
            program.remove(at as isize, count);
        }
        Delta::Remove { at, payload, .. } => {
            if let Err(err) = program.insert(at.min(program.len()), payload) {
                tracing::warn!(%err, "could not restore removed tokens");
                return None;
            }
            log.push(&Delta::Insert {
                at,
                count: payload.len(),
                cursor_was: cursor,
            });
        }
    }
    Some(delta.cursor_was())
}

impl<const BUF: usize, const LINES: usize, const LOG: usize> Default for Document<BUF, LINES, LOG> {
    fn default() -> Self {
        Self::new()
    }
}
