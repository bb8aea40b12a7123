//! Capacity errors

use thiserror::Error;

/// An edit or load that would not fit in the document's fixed storage.
///
/// Always raised before anything is written, so the document is unchanged
/// when one of these comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("program buffer full: {requested} bytes requested, {available} available")]
    BufferFull { requested: usize, available: usize },

    #[error("too many lines: line index holds at most {capacity} entries")]
    LineIndexFull { capacity: usize },

    #[error("program of {size} bytes exceeds capacity of {capacity}")]
    ProgramTooLarge { size: usize, capacity: usize },
}
