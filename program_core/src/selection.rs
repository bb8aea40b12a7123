//! Selection ranges
//!
//! A selection is the cursor plus an anchor. The selected span always covers
//! whole tokens: it runs from the smaller offset through the last byte of the
//! token under the larger one.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::token;

/// Inclusive byte range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct SelectionRange {
    pub min: usize,
    pub max: usize,
}

impl SelectionRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Number of bytes covered.
    pub const fn len(&self) -> usize {
        self.max + 1 - self.min
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.min && offset <= self.max
    }
}

/// Range selected between `cursor` and `anchor` in `bytes`.
///
/// Both ends must be token starts.
///
/// The end-of-program slot (`offset == bytes.len()`) counts as a 1-byte
/// token, so a selection reaching it has `max == bytes.len()`.
pub fn selecting_range(bytes: &[u8], cursor: usize, anchor: usize) -> SelectionRange {
    let (min, max) = if cursor < anchor {
        (cursor, anchor)
    } else {
        (anchor, cursor)
    };
    let size = token::token_size_at(bytes, max);
    SelectionRange::new(min, max + size - 1)
}
