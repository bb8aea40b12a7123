#![no_std]

//! # Program Core
//!
//! In-place editable model of a tokenized program, shared by every host that
//! edits programs.
//!
//! ## Philosophy
//!
//! - **No allocation**: every structure has a capacity fixed at compile time
//! - **Capacity errors up front**: an edit that would not fit is rejected
//!   before a single byte moves
//! - **One funnel for mutation**: insert and remove are the only primitives;
//!   undo/redo wraps them
//! - **Tokens, not bytes**: cursor and selection never split a 2-byte token
//!
//! ## Design
//!
//! The core provides:
//! - `token`: 1-/2-byte token classification
//! - `ProgramBuffer`: token bytes plus the line-break index kept in step with them
//! - `indent`: lazily refreshed block nesting depth per line
//! - `DeltaLog`: byte-budgeted undo/redo records with FIFO eviction
//! - `Document`: the single owned value the editing layer works through

#[cfg(test)]
extern crate alloc;

pub mod buffer;
pub mod delta;
pub mod document;
pub mod error;
pub mod indent;
pub mod lines;
pub mod selection;
pub mod token;

pub use buffer::ProgramBuffer;
pub use delta::{Delta, DeltaKind, DeltaLog};
pub use document::{Document, DELTA_LOG_CAPACITY, LINE_CAPACITY, PROGRAM_CAPACITY};
pub use error::CapacityError;
pub use lines::{LineEntry, LineIndex};
pub use selection::SelectionRange;
pub use token::{token_size, LINEBREAK, SPACE};
