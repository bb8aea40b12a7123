//! Session snapshot for deterministic replay testing

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Complete observable editor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub cursor: usize,
    pub anchor: Option<usize>,
    pub program: Vec<u8>,
    pub line_starts: Vec<usize>,
    pub clipboard: Vec<u8>,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub dirty: bool,
}

impl SessionSnapshot {
    /// Deterministic hash of the snapshot, for fast comparison of replays.
    pub fn hash(&self) -> u64 {
        let mut hasher = Sha256::new();

        hasher.update((self.cursor as u64).to_le_bytes());
        match self.anchor {
            Some(anchor) => {
                hasher.update([1u8]);
                hasher.update((anchor as u64).to_le_bytes());
            }
            None => hasher.update([0u8]),
        }

        hasher.update((self.program.len() as u64).to_le_bytes());
        hasher.update(&self.program);
        for start in &self.line_starts {
            hasher.update((*start as u64).to_le_bytes());
        }
        hasher.update((self.clipboard.len() as u64).to_le_bytes());
        hasher.update(&self.clipboard);

        hasher.update((self.undo_depth as u64).to_le_bytes());
        hasher.update((self.redo_depth as u64).to_le_bytes());
        hasher.update([self.dirty as u8]);

        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }
}
