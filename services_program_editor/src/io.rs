//! Program persistence
//!
//! A persisted program is its raw token bytes followed by their length as a
//! little-endian u16, the layout the calculator uses for program variables.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bytes taken by the trailing length field.
const LENGTH_LEN: usize = 2;

/// Program store error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persisted program truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("Persisted program corrupt: length field says {stored}, found {actual} bytes")]
    Corrupt { stored: usize, actual: usize },

    #[error("Program too large to persist: {size} bytes")]
    TooLarge { size: usize },
}

/// Encode `program` in the persisted layout.
pub fn encode_persisted(program: &[u8]) -> Result<Vec<u8>, StoreError> {
    let len = u16::try_from(program.len()).map_err(|_| StoreError::TooLarge {
        size: program.len(),
    })?;
    let mut out = Vec::with_capacity(program.len() + LENGTH_LEN);
    out.extend_from_slice(program);
    out.extend_from_slice(&len.to_le_bytes());
    Ok(out)
}

/// Recover the program bytes from the persisted layout.
pub fn decode_persisted(persisted: &[u8]) -> Result<&[u8], StoreError> {
    let Some(split) = persisted.len().checked_sub(LENGTH_LEN) else {
        return Err(StoreError::Truncated {
            len: persisted.len(),
        });
    };
    let (program, length) = persisted.split_at(split);
    let stored = u16::from_le_bytes([length[0], length[1]]) as usize;
    if stored != program.len() {
        return Err(StoreError::Corrupt {
            stored,
            actual: program.len(),
        });
    }
    Ok(program)
}

/// Where programs are loaded from and saved to.
pub trait ProgramStore {
    /// Load the program, or `None` if nothing has been saved yet.
    fn load(&mut self) -> Result<Option<Vec<u8>>, StoreError>;

    fn save(&mut self, program: &[u8]) -> Result<(), StoreError>;
}

/// In-memory store for tests and simulation.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    persisted: Option<Vec<u8>>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: &[u8]) -> Result<Self, StoreError> {
        Ok(Self {
            persisted: Some(encode_persisted(program)?),
            saves: 0,
        })
    }

    /// Stored bytes in the persisted layout.
    pub fn persisted(&self) -> Option<&[u8]> {
        self.persisted.as_deref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProgramStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        match &self.persisted {
            Some(bytes) => Ok(Some(decode_persisted(bytes)?.to_vec())),
            None => Ok(None),
        }
    }

    fn save(&mut self, program: &[u8]) -> Result<(), StoreError> {
        self.persisted = Some(encode_persisted(program)?);
        self.saves += 1;
        Ok(())
    }
}

/// Store backed by a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgramStore for FileStore {
    fn load(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        let persisted = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(decode_persisted(&persisted)?.to_vec()))
    }

    fn save(&mut self, program: &[u8]) -> Result<(), StoreError> {
        let persisted = encode_persisted(program)?;
        fs::write(&self.path, persisted)?;
        tracing::debug!(path = %self.path.display(), bytes = program.len(), "program written");
        Ok(())
    }
}
