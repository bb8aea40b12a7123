//! Editor configuration
//!
//! Typed settings parsed from JSON. Missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::editor::EditorResult;

/// Largest clipboard the editor will hold.
pub const CLIPBOARD_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Ask the host to save after this many edits; 0 disables autosave
    pub autosave_every_edits: u32,
    /// Lines moved by page up/down
    pub page_lines: usize,
    /// Clipboard size limit, at most [`CLIPBOARD_CAPACITY`]
    pub clipboard_capacity: usize,
}

impl EditorConfig {
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Clamp fields into the ranges the editor supports.
    pub fn normalized(mut self) -> Self {
        self.clipboard_capacity = self.clipboard_capacity.min(CLIPBOARD_CAPACITY);
        self.page_lines = self.page_lines.max(1);
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_every_edits: 32,
            page_lines: 8,
            clipboard_capacity: CLIPBOARD_CAPACITY,
        }
    }
}
