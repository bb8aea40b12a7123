//! Reversible edit records and the byte-budgeted log that holds them
//!
//! Records are packed back to back in a fixed arena, oldest first. Each one
//! is self-describing: an 11-byte header followed, for removals, by the
//! removed bytes. Finding the newest record means walking the arena from the
//! front; that O(n) walk is what keeps the format free of any side table.
//!
//! When a new record does not fit, the oldest records are evicted until it
//! does. A record that could never fit is dropped and the edit it describes
//! simply cannot be undone.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

const TAG_INSERT: u8 = 0;
const TAG_REMOVE: u8 = 1;

/// Encoded header size: tag, cursor_was (u32), at (u32), count (u16).
pub const HEADER_LEN: usize = 11;

/// Which way an edit went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum DeltaKind {
    Insert,
    Remove,
}

/// One reversible edit.
///
/// An insertion needs no payload: the inserted bytes are whatever sits in
/// the program at `at..at + count` right after it. A removal carries the
/// bytes it took out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta<'a> {
    Insert {
        at: usize,
        count: usize,
        cursor_was: usize,
    },
    Remove {
        at: usize,
        cursor_was: usize,
        payload: &'a [u8],
    },
}

impl<'a> Delta<'a> {
    pub fn kind(&self) -> DeltaKind {
        match self {
            Delta::Insert { .. } => DeltaKind::Insert,
            Delta::Remove { .. } => DeltaKind::Remove,
        }
    }

    pub fn at(&self) -> usize {
        match *self {
            Delta::Insert { at, .. } | Delta::Remove { at, .. } => at,
        }
    }

    /// Number of bytes the edit touched.
    pub fn count(&self) -> usize {
        match *self {
            Delta::Insert { count, .. } => count,
            Delta::Remove { payload, .. } => payload.len(),
        }
    }

    /// Cursor position immediately before the edit.
    pub fn cursor_was(&self) -> usize {
        match *self {
            Delta::Insert { cursor_was, .. } | Delta::Remove { cursor_was, .. } => cursor_was,
        }
    }

    /// Bytes this record takes up in a log.
    pub fn encoded_len(&self) -> usize {
        match self {
            Delta::Insert { .. } => HEADER_LEN,
            Delta::Remove { payload, .. } => HEADER_LEN + payload.len(),
        }
    }

    /// Whether the header fields fit their encoded widths.
    fn encodable(&self) -> bool {
        u32::try_from(self.at()).is_ok()
            && u32::try_from(self.cursor_was()).is_ok()
            && u16::try_from(self.count()).is_ok()
    }

    fn encode_into(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.encoded_len());
        out[0] = match self.kind() {
            DeltaKind::Insert => TAG_INSERT,
            DeltaKind::Remove => TAG_REMOVE,
        };
        out[1..5].copy_from_slice(&(self.cursor_was() as u32).to_le_bytes());
        out[5..9].copy_from_slice(&(self.at() as u32).to_le_bytes());
        out[9..11].copy_from_slice(&(self.count() as u16).to_le_bytes());
        if let Delta::Remove { payload, .. } = self {
            out[HEADER_LEN..].copy_from_slice(payload);
        }
    }

    /// Decode the record at the front of `bytes`.
    fn decode(bytes: &'a [u8]) -> Option<Delta<'a>> {
        let header = bytes.get(..HEADER_LEN)?;
        let cursor_was = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;
        let at = u32::from_le_bytes([header[5], header[6], header[7], header[8]]) as usize;
        let count = u16::from_le_bytes([header[9], header[10]]) as usize;
        match header[0] {
            TAG_INSERT => Some(Delta::Insert {
                at,
                count,
                cursor_was,
            }),
            TAG_REMOVE => Some(Delta::Remove {
                at,
                cursor_was,
                payload: bytes.get(HEADER_LEN..HEADER_LEN + count)?,
            }),
            _ => None,
        }
    }
}

/// Encoded length of the record at the front of `bytes`.
fn record_len(bytes: &[u8]) -> usize {
    match Delta::decode(bytes) {
        Some(delta) => delta.encoded_len(),
        None => {
            debug_assert!(false, "corrupt delta record");
            bytes.len()
        }
    }
}

/// Fixed-size arena of delta records.
#[derive(Debug, Clone)]
pub struct DeltaLog<const N: usize> {
    data: [u8; N],
    used: usize,
    count: usize,
}

impl<const N: usize> DeltaLog<N> {
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            used: 0,
            count: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bytes occupied by live records.
    pub fn bytes_used(&self) -> usize {
        self.used
    }

    pub fn clear(&mut self) {
        self.used = 0;
        self.count = 0;
    }

    /// Append `delta`, evicting the oldest records until it fits.
    ///
    /// Returns false, leaving the log untouched, when the record is larger
    /// than the whole arena.
    pub fn push(&mut self, delta: &Delta<'_>) -> bool {
        let size = delta.encoded_len();
        if size > N || !delta.encodable() {
            tracing::debug!(size, capacity = N, "delta too large for log, edit not undoable");
            return false;
        }

        while self.used + size > N {
            self.evict_oldest();
        }

        delta.encode_into(&mut self.data[self.used..self.used + size]);
        self.used += size;
        self.count += 1;
        true
    }

    fn evict_oldest(&mut self) {
        debug_assert!(self.count > 0, "log over budget with no records");
        let size = record_len(&self.data[..self.used]);
        self.data.copy_within(size..self.used, 0);
        self.used -= size;
        self.count -= 1;
        tracing::trace!(evicted = size, remaining = self.count, "delta evicted");
    }

    /// Remove and return the newest record.
    ///
    /// The returned payload borrows the arena bytes just past the new end,
    /// which stay intact until the next push.
    pub fn pop(&mut self) -> Option<Delta<'_>> {
        if self.count == 0 {
            return None;
        }

        let mut last = 0;
        let mut offset = 0;
        for _ in 0..self.count {
            last = offset;
            offset += record_len(&self.data[offset..self.used]);
        }
        debug_assert_eq!(offset, self.used);

        self.used = last;
        self.count -= 1;
        Delta::decode(&self.data[last..])
    }

    /// Live records, oldest first.
    pub fn iter(&self) -> Records<'_> {
        Records {
            data: &self.data[..self.used],
            remaining: self.count,
        }
    }
}

impl<const N: usize> Default for DeltaLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the records of a [`DeltaLog`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    data: &'a [u8],
    remaining: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = Delta<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let delta = Delta::decode(self.data)?;
        self.data = &self.data[delta.encoded_len()..];
        self.remaining -= 1;
        Some(delta)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
