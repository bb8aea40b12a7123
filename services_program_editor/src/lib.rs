//! # Program Editor Service
//!
//! Editing layer over [`program_core::Document`]: turns user-level actions
//! into token edits, owns the clipboard and hands persistence to a
//! [`ProgramStore`].
//!
//! ## Philosophy
//!
//! - **Actions, not keys**: Hosts map their keypad onto [`EditAction`]s
//! - **No ambient storage**: Programs come from and go to an injected store
//! - **Bounded**: The clipboard is a fixed 256-byte slot, like the document
//! - **Testable**: Every workflow runs headless against a `MemoryStore`
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A renderer (hosts draw from the document and `indentation`)
//! - A token catalog or keymap
//! - A program runner
//!
//! ## Design
//!
//! - `ProgramEditor::apply` is the single entry point for edits
//! - Capacity failures come back as `EditorError::Capacity`; the host shows
//!   them and ends the session
//! - Undo history lives only in memory and is never persisted

pub mod action;
pub mod config;
pub mod editor;
pub mod io;
pub mod snapshot;

pub use action::{prgm_call, EditAction, EditOutcome, Token, PRGM};
pub use config::{EditorConfig, CLIPBOARD_CAPACITY};
pub use editor::{EditorError, EditorResult, ProgramEditor};
pub use io::{decode_persisted, encode_persisted, FileStore, MemoryStore, ProgramStore, StoreError};
pub use snapshot::SessionSnapshot;
