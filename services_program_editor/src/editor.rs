//! Main editor implementation

use crate::action::{EditAction, EditOutcome};
use crate::config::{EditorConfig, CLIPBOARD_CAPACITY};
use crate::io::{ProgramStore, StoreError};
use crate::snapshot::SessionSnapshot;
use program_core::{CapacityError, Document, LINEBREAK};
use thiserror::Error;

/// Editor error
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Out of space: {0}")]
    Capacity(#[from] CapacityError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Editor result
pub type EditorResult<T> = Result<T, EditorError>;

/// What a single action did, before autosave is accounted for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Unchanged,
    /// Cursor, selection or clipboard moved
    Moved,
    /// Program bytes changed
    Edited,
    Message(String),
    Exit,
}

/// Fixed-size clipboard.
#[derive(Debug, Clone)]
struct Clipboard {
    bytes: [u8; CLIPBOARD_CAPACITY],
    len: usize,
}

impl Clipboard {
    fn new() -> Self {
        Self {
            bytes: [0; CLIPBOARD_CAPACITY],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    fn set(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= CLIPBOARD_CAPACITY);
        let len = bytes.len().min(CLIPBOARD_CAPACITY);
        self.bytes[..len].copy_from_slice(&bytes[..len]);
        self.len = len;
    }
}

/// Token program editor
pub struct ProgramEditor {
    document: Box<Document>,
    clipboard: Clipboard,
    config: EditorConfig,
    edits_since_save: u32,
}

impl ProgramEditor {
    /// Create an editor on an empty program
    pub fn new(config: EditorConfig) -> Self {
        Self {
            document: Box::new(Document::new()),
            clipboard: Clipboard::new(),
            config: config.normalized(),
            edits_since_save: 0,
        }
    }

    /// Open the program held by `store`; an empty store gives an empty program.
    pub fn open(store: &mut impl ProgramStore, config: EditorConfig) -> EditorResult<Self> {
        let mut editor = Self::new(config);
        match store.load()? {
            Some(program) => {
                editor.document.load(&program)?;
                tracing::info!(
                    bytes = program.len(),
                    lines = editor.document.line_count(),
                    "program loaded"
                );
            }
            None => tracing::info!("no saved program, starting empty"),
        }
        Ok(editor)
    }

    /// Persist the program and clear the dirty flag.
    pub fn save(&mut self, store: &mut impl ProgramStore) -> EditorResult<()> {
        store.save(self.document.as_bytes())?;
        self.document.mark_saved();
        self.edits_since_save = 0;
        tracing::info!(bytes = self.document.len(), "program saved");
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn cursor(&self) -> usize {
        self.document.cursor()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.dirty()
    }

    pub fn clipboard(&self) -> &[u8] {
        self.clipboard.as_bytes()
    }

    /// Indentation of `line` for display
    pub fn indentation(&mut self, line: usize) -> u8 {
        self.document.indentation(line)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cursor: self.document.cursor(),
            anchor: self.document.anchor(),
            program: self.document.as_bytes().to_vec(),
            line_starts: self
                .document
                .line_entries()
                .iter()
                .map(|entry| entry.start)
                .collect(),
            clipboard: self.clipboard.as_bytes().to_vec(),
            undo_depth: self.document.undo_depth(),
            redo_depth: self.document.redo_depth(),
            dirty: self.document.dirty(),
        }
    }

    /// Apply one action
    pub fn apply(&mut self, action: EditAction) -> EditorResult<EditOutcome> {
        tracing::debug!(?action, cursor = self.document.cursor(), "apply");

        let step = match action {
            EditAction::InsertToken(token) => {
                insert_at_cursor(&mut self.document, token.as_bytes(), true)?
            }
            EditAction::InsertRun(tokens) => insert_at_cursor(&mut self.document, &tokens, true)?,
            EditAction::Newline => insert_at_cursor(&mut self.document, &[LINEBREAK], true)?,
            EditAction::Delete => self.delete(),
            EditAction::ToggleSelection => self.toggle_selection(),
            EditAction::Copy => self.copy(false)?,
            EditAction::Cut => self.copy(true)?,
            EditAction::Paste => self.paste(true)?,
            EditAction::ClearLine => self.clear_line(),
            EditAction::MoveLeft => {
                let target = self.document.previous_token_start(self.document.cursor());
                self.move_to(target)
            }
            EditAction::MoveRight => {
                let target = self.document.next_token_start(self.document.cursor());
                self.move_to(target)
            }
            EditAction::MoveUp => self.move_lines(-1),
            EditAction::MoveDown => self.move_lines(1),
            EditAction::PageUp => self.move_lines(-(self.config.page_lines as isize)),
            EditAction::PageDown => self.move_lines(self.config.page_lines as isize),
            EditAction::Undo => match self.document.undo() {
                Some(_) => Step::Edited,
                None => Step::Message("Already at oldest change".to_string()),
            },
            EditAction::Redo => match self.document.redo() {
                Some(_) => Step::Edited,
                None => Step::Message("Already at newest change".to_string()),
            },
            EditAction::Quit => Step::Exit,
        };

        Ok(self.finish(step))
    }

    fn finish(&mut self, step: Step) -> EditOutcome {
        match step {
            Step::Unchanged => EditOutcome::Continue,
            Step::Moved => EditOutcome::Changed,
            Step::Message(message) => EditOutcome::StatusMessage(message),
            Step::Exit => EditOutcome::RequestExit,
            Step::Edited => {
                self.edits_since_save += 1;
                let every = self.config.autosave_every_edits;
                if every > 0 && self.edits_since_save >= every {
                    self.edits_since_save = 0;
                    tracing::debug!(every, "autosave due");
                    EditOutcome::RequestSave
                } else {
                    EditOutcome::Changed
                }
            }
        }
    }

    fn delete(&mut self) -> Step {
        if let Some(range) = self.document.selection() {
            let (at, removed) = self.document.remove_tokens(range.min as isize, range.len());
            self.document.set_cursor(at);
            self.document.set_anchor(None);
            return if removed > 0 { Step::Edited } else { Step::Moved };
        }

        let cursor = self.document.cursor();
        if cursor >= self.document.len() {
            return Step::Unchanged;
        }
        let size = self.document.token_size(cursor);
        self.document.remove_tokens(cursor as isize, size);
        Step::Edited
    }

    fn toggle_selection(&mut self) -> Step {
        let anchor = match self.document.anchor() {
            Some(_) => None,
            None => Some(self.document.cursor()),
        };
        self.document.set_anchor(anchor);
        Step::Moved
    }

    /// Copy, or cut when `remove` is set. Without a selection this pastes:
    /// in place for copy, advancing for cut.
    fn copy(&mut self, remove: bool) -> EditorResult<Step> {
        let Some(range) = self.document.selection() else {
            return self.paste(remove);
        };

        let selected = self.document.slice_range(range);
        if selected.len() > self.config.clipboard_capacity {
            tracing::warn!(
                size = selected.len(),
                capacity = self.config.clipboard_capacity,
                "selection too large for clipboard"
            );
            return Ok(Step::Message(format!(
                "Selection too large to copy ({} bytes)",
                selected.len()
            )));
        }
        let count = selected.len();
        self.clipboard.set(selected);
        self.document.set_anchor(None);

        if !remove {
            return Ok(Step::Moved);
        }
        self.document.remove_tokens(range.min as isize, count);
        self.document.set_cursor(range.min);
        Ok(if count > 0 { Step::Edited } else { Step::Moved })
    }

    fn paste(&mut self, advance: bool) -> EditorResult<Step> {
        insert_at_cursor(&mut self.document, self.clipboard.as_bytes(), advance)
    }

    fn clear_line(&mut self) -> Step {
        let line = self.document.cursor_line();
        let (Some(start), Some(end)) = (self.document.line_offset(line), self.document.line_end(line))
        else {
            return Step::Unchanged;
        };
        if end <= start {
            return Step::Unchanged;
        }
        self.document.remove_tokens(start as isize, end - start);
        self.document.set_cursor(start);
        Step::Edited
    }

    fn move_to(&mut self, target: usize) -> Step {
        if target == self.document.cursor() {
            return Step::Unchanged;
        }
        self.document.set_cursor(target);
        Step::Moved
    }

    /// Move `by` lines, landing on the start of the target line.
    fn move_lines(&mut self, by: isize) -> Step {
        let last = self.document.line_count().saturating_sub(1);
        let line = self.document.cursor_line();
        let target = if by < 0 {
            line.saturating_sub(by.unsigned_abs())
        } else {
            line.saturating_add(by as usize).min(last)
        };
        match self.document.line_offset(target) {
            Some(start) => self.move_to(start),
            None => Step::Unchanged,
        }
    }
}

impl Default for ProgramEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Insert `tokens` at the cursor, stepping past them when `advance` is set.
fn insert_at_cursor(document: &mut Document, tokens: &[u8], advance: bool) -> EditorResult<Step> {
    if tokens.is_empty() {
        return Ok(Step::Unchanged);
    }
    let at = document.cursor();
    if let Err(err) = document.insert_tokens(at, tokens) {
        tracing::warn!(%err, at, count = tokens.len(), "edit rejected");
        return Err(err.into());
    }
    if advance {
        document.set_cursor(at + tokens.len());
    }
    Ok(Step::Edited)
}
