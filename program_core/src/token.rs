//! Token classification
//!
//! Programs are stored as a run of 1- or 2-byte tokens. A token is two bytes
//! long exactly when its first byte is one of a fixed set of lead values.
//! Nothing in here keeps state; every other module leans on these helpers to
//! step through a buffer without landing in the middle of a token.

/// Line break token (`:` shown as a new line)
pub const LINEBREAK: u8 = 0x3F;

/// Space token
pub const SPACE: u8 = 0x29;

/// Statement separator token (`:`)
pub const COLON: u8 = 0x3E;

/// `If `
pub const IF: u8 = 0xCE;
/// `Then`
pub const THEN: u8 = 0xCF;
/// `Else`
pub const ELSE: u8 = 0xD0;
/// `While `
pub const WHILE: u8 = 0xD1;
/// `Repeat `
pub const REPEAT: u8 = 0xD2;
/// `For(`
pub const FOR: u8 = 0xD3;
/// `End`
pub const END: u8 = 0xD4;

/// First bytes of every 2-byte token.
pub const TWO_BYTE_LEADS: [u8; 11] = [
    0x5C, 0x5D, 0x5E, 0x60, 0x61, 0x62, 0x63, 0x7B, 0xAA, 0xBB, 0xEF,
];

/// Returns true if `byte` starts a 2-byte token.
#[inline]
pub const fn is_two_byte_lead(byte: u8) -> bool {
    matches!(
        byte,
        0x5C | 0x5D | 0x5E | 0x60 | 0x61 | 0x62 | 0x63 | 0x7B | 0xAA | 0xBB | 0xEF
    )
}

/// Size of the token at `pos`, always 1 or 2.
///
/// `pos` may point at either byte of a 2-byte token: when the byte to the
/// left is a lead value, `pos` is treated as the tail of that token and 2 is
/// reported. This guess is only for offsets of unknown alignment; it misreads
/// a token start whose left neighbour is a tail that equals a lead value.
/// Positions known to be token starts use [`token_size_at`].
///
/// `pos` must be inside `bytes`.
pub fn token_size(bytes: &[u8], pos: usize) -> usize {
    debug_assert!(pos < bytes.len(), "token_size({}) past end {}", pos, bytes.len());
    let Some(&byte) = bytes.get(pos) else {
        return 1;
    };
    if is_two_byte_lead(byte) {
        return 2;
    }
    if pos > 0 && is_two_byte_lead(bytes[pos - 1]) {
        return 2;
    }
    1
}

/// Size of the token starting at `pos`, judged by its first byte alone.
///
/// Only valid where `pos` is known to be a token start. Past the end counts
/// as 1.
#[inline]
pub fn token_size_at(bytes: &[u8], pos: usize) -> usize {
    match bytes.get(pos) {
        Some(&byte) if is_two_byte_lead(byte) => 2,
        _ => 1,
    }
}

/// Offset of the token boundary following the token start `pos`, clamped to
/// `bytes.len()`.
pub fn next_token_boundary(bytes: &[u8], pos: usize) -> usize {
    if pos >= bytes.len() {
        return bytes.len();
    }
    (pos + token_size_at(bytes, pos)).min(bytes.len())
}

/// Start of the token containing `offset`, walking forward from the known
/// token start `from`.
///
/// A 2-byte token may end in a byte that is itself a lead value, so looking
/// one byte to the left cannot tell a token start from a tail. Walking from
/// a known start can.
pub fn token_start_at_or_before(bytes: &[u8], from: usize, offset: usize) -> usize {
    let offset = offset.min(bytes.len());
    let mut start = from.min(offset);
    let mut pos = start;
    while pos < offset {
        start = pos;
        pos += token_size_at(bytes, pos);
    }
    if pos == offset {
        offset
    } else {
        start
    }
}

/// Start of the token before the token start `pos`, or 0.
///
/// `from` must be a token start no later than `pos - 1`.
pub fn previous_token_boundary(bytes: &[u8], from: usize, pos: usize) -> usize {
    let pos = pos.min(bytes.len());
    if pos == 0 {
        return 0;
    }
    token_start_at_or_before(bytes, from, pos - 1)
}

/// Walks the token starts of `bytes` in order.
pub fn token_starts(bytes: &[u8]) -> TokenStarts<'_> {
    TokenStarts { bytes, pos: 0 }
}

/// Iterator over `(offset, size)` of each token.
#[derive(Debug, Clone)]
pub struct TokenStarts<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Iterator for TokenStarts<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let start = self.pos;
        self.pos = next_token_boundary(self.bytes, start);
        Some((start, self.pos - start))
    }
}
