//! Editing actions and their outcomes

use program_core::token::is_two_byte_lead;
use serde::{Deserialize, Serialize};

/// The `prgm` token that precedes a program name in a call.
pub const PRGM: u8 = 0x5F;

/// Longest program name a call can carry.
const PROGRAM_NAME_MAX: usize = 8;

/// One program token, 1 or 2 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    bytes: [u8; 2],
    len: u8,
}

impl Token {
    pub const fn single(byte: u8) -> Self {
        Self {
            bytes: [byte, 0],
            len: 1,
        }
    }

    pub const fn double(lead: u8, tail: u8) -> Self {
        Self {
            bytes: [lead, tail],
            len: 2,
        }
    }

    /// Token from its catalog value.
    ///
    /// Values below 0x100 are single bytes. Wider values are stored
    /// little-endian, so `0xB0BB` is the lead `0xBB` followed by `0xB0`.
    pub const fn from_catalog(value: u16) -> Self {
        let [low, high] = value.to_le_bytes();
        if high == 0 {
            Self::single(low)
        } else {
            Self::double(low, high)
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the first byte announces a 2-byte token.
    pub fn is_two_byte(&self) -> bool {
        is_two_byte_lead(self.bytes[0])
    }
}

/// Tokens for calling another program: `prgm` then up to 8 name bytes.
///
/// Names longer than 8 bytes are cut, matching what the calculator accepts.
pub fn prgm_call(name: &[u8]) -> Vec<u8> {
    let name = &name[..name.len().min(PROGRAM_NAME_MAX)];
    let mut tokens = Vec::with_capacity(name.len() + 1);
    tokens.push(PRGM);
    tokens.extend_from_slice(name);
    tokens
}

/// A user-level edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditAction {
    /// Insert one token at the cursor and step past it
    InsertToken(Token),
    /// Insert a run of token bytes at the cursor and step past it
    InsertRun(Vec<u8>),
    /// Insert a line break at the cursor
    Newline,
    /// Delete the selection, or the token under the cursor
    Delete,
    /// Start a selection at the cursor, or drop the current one
    ToggleSelection,
    /// Copy the selection; pastes without moving when nothing is selected
    Copy,
    /// Cut the selection; pastes and advances when nothing is selected
    Cut,
    /// Insert the clipboard at the cursor and step past it
    Paste,
    /// Remove everything on the cursor's line except its break
    ClearLine,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Undo,
    Redo,
    Quit,
}

/// Outcome from applying an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing changed
    Continue,
    /// Program, cursor or selection changed
    Changed,
    /// Enough edits piled up that the host should save now
    RequestSave,
    /// Request to leave the editor
    RequestExit,
    /// Display a status message; nothing changed
    StatusMessage(String),
}
