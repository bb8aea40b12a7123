//! Integration tests for the program editor
//!
//! These tests drive complete editing sessions through `ProgramEditor::apply`
//! the way a host maps its keypad onto actions.

use program_core::token::{is_two_byte_lead, token_starts, END, IF, THEN, TWO_BYTE_LEADS, WHILE};
use program_core::{CapacityError, LINEBREAK, LINE_CAPACITY, PROGRAM_CAPACITY};
use proptest::prelude::*;
use services_program_editor::{
    prgm_call, EditAction, EditOutcome, EditorConfig, EditorError, FileStore, MemoryStore,
    ProgramEditor, ProgramStore, Token,
};

fn no_autosave() -> EditorConfig {
    EditorConfig {
        autosave_every_edits: 0,
        ..EditorConfig::default()
    }
}

fn open(program: &[u8]) -> ProgramEditor {
    let mut store = MemoryStore::with_program(program).unwrap();
    ProgramEditor::open(&mut store, no_autosave()).unwrap()
}

/// Type single-byte tokens, turning line breaks into `Newline`.
fn type_bytes(editor: &mut ProgramEditor, bytes: &[u8]) {
    for byte in bytes {
        let action = if *byte == LINEBREAK {
            EditAction::Newline
        } else {
            EditAction::InsertToken(Token::single(*byte))
        };
        editor.apply(action).unwrap();
    }
}

fn press(editor: &mut ProgramEditor, action: EditAction, times: usize) {
    for _ in 0..times {
        editor.apply(action.clone()).unwrap();
    }
}

fn line_starts(editor: &ProgramEditor) -> Vec<usize> {
    editor.document().line_entries().iter().map(|e| e.start).collect()
}

#[test]
fn test_typing_a_block_program() {
    let mut editor = ProgramEditor::new(no_autosave());
    type_bytes(
        &mut editor,
        &[
            WHILE, 0x31, LINEBREAK, IF, 0x41, LINEBREAK, THEN, LINEBREAK, 0x42, LINEBREAK, END,
            LINEBREAK, END,
        ],
    );

    assert_eq!(editor.document().line_count(), 6);
    assert_eq!(editor.cursor(), editor.document().len());
    let indents: Vec<u8> = (0..6).map(|line| editor.indentation(line)).collect();
    assert_eq!(indents, [0, 1, 1, 2, 1, 0]);
}

#[test]
fn test_newline_splits_line_and_reindents() {
    // If 1=1 Then, then split before Then
    let mut editor = open(&[IF, 0x31, 0x6A, 0x31, THEN, LINEBREAK, 0x42]);
    assert_eq!(editor.indentation(1), 1);

    press(&mut editor, EditAction::MoveRight, 4);
    editor.apply(EditAction::Newline).unwrap();

    assert_eq!(
        editor.document().as_bytes(),
        &[IF, 0x31, 0x6A, 0x31, LINEBREAK, THEN, LINEBREAK, 0x42]
    );
    assert_eq!(line_starts(&editor), [0, 5, 7]);
    assert_eq!(editor.cursor(), 5);
    assert_eq!(editor.indentation(1), 0);
    assert_eq!(editor.indentation(2), 1);
}

#[test]
fn test_cut_then_paste_elsewhere() {
    let mut editor = open(&[0x41, 0x42, 0x43, 0x44]);

    editor.apply(EditAction::MoveRight).unwrap();
    editor.apply(EditAction::ToggleSelection).unwrap();
    editor.apply(EditAction::MoveRight).unwrap();
    editor.apply(EditAction::Cut).unwrap();

    assert_eq!(editor.document().as_bytes(), &[0x41, 0x44]);
    assert_eq!(editor.clipboard(), &[0x42, 0x43]);
    assert_eq!(editor.cursor(), 1);
    assert!(!editor.document().is_selecting());

    editor.apply(EditAction::MoveRight).unwrap();
    editor.apply(EditAction::Paste).unwrap();
    assert_eq!(editor.document().as_bytes(), &[0x41, 0x44, 0x42, 0x43]);
    assert_eq!(editor.cursor(), 4);

    // Copy with nothing selected pastes in place
    editor.apply(EditAction::Copy).unwrap();
    assert_eq!(
        editor.document().as_bytes(),
        &[0x41, 0x44, 0x42, 0x43, 0x42, 0x43]
    );
    assert_eq!(editor.cursor(), 4);
}

#[test]
fn test_copy_selection_reaching_end() {
    let mut editor = open(&[0x41, 0x42]);
    editor.apply(EditAction::ToggleSelection).unwrap();
    press(&mut editor, EditAction::MoveRight, 2);

    assert_eq!(editor.apply(EditAction::Copy).unwrap(), EditOutcome::Changed);
    assert_eq!(editor.clipboard(), &[0x41, 0x42]);
    assert_eq!(editor.document().as_bytes(), &[0x41, 0x42]);
    assert!(!editor.is_dirty());
}

#[test]
fn test_delete_selection_covers_two_byte_token() {
    let mut editor = open(&[0x41, 0xBB, 0xB0, 0x42]);
    editor.apply(EditAction::ToggleSelection).unwrap();
    editor.apply(EditAction::MoveRight).unwrap();
    editor.apply(EditAction::Delete).unwrap();

    assert_eq!(editor.document().as_bytes(), &[0x42]);
    assert_eq!(editor.cursor(), 0);
    assert!(!editor.document().is_selecting());

    editor.apply(EditAction::Undo).unwrap();
    assert_eq!(editor.document().as_bytes(), &[0x41, 0xBB, 0xB0, 0x42]);
    assert_eq!(editor.cursor(), 1);
}

#[test]
fn test_clear_line_keeps_break() {
    let mut editor = open(&[0x41, 0x42, LINEBREAK, 0x43, 0x44, LINEBREAK, 0x45]);
    editor.apply(EditAction::MoveDown).unwrap();
    editor.apply(EditAction::MoveRight).unwrap();
    assert_eq!(editor.cursor(), 4);

    editor.apply(EditAction::ClearLine).unwrap();
    assert_eq!(
        editor.document().as_bytes(),
        &[0x41, 0x42, LINEBREAK, LINEBREAK, 0x45]
    );
    assert_eq!(editor.cursor(), 3);
    assert_eq!(line_starts(&editor), [0, 3, 4]);

    // Clearing an empty line does nothing
    assert_eq!(
        editor.apply(EditAction::ClearLine).unwrap(),
        EditOutcome::Continue
    );

    editor.apply(EditAction::Undo).unwrap();
    assert_eq!(
        editor.document().as_bytes(),
        &[0x41, 0x42, LINEBREAK, 0x43, 0x44, LINEBREAK, 0x45]
    );
    assert_eq!(editor.cursor(), 4);
}

#[test]
fn test_line_and_page_movement() {
    // Twelve lines of "A", each two bytes with its break
    let mut program = Vec::new();
    for _ in 0..11 {
        program.extend_from_slice(&[0x41, LINEBREAK]);
    }
    program.push(0x41);
    let mut editor = open(&program);

    editor.apply(EditAction::PageDown).unwrap();
    assert_eq!(editor.cursor(), 16);
    editor.apply(EditAction::PageDown).unwrap();
    assert_eq!(editor.cursor(), 22);
    assert_eq!(
        editor.apply(EditAction::MoveDown).unwrap(),
        EditOutcome::Continue
    );

    editor.apply(EditAction::PageUp).unwrap();
    assert_eq!(editor.cursor(), 6);
    editor.apply(EditAction::MoveUp).unwrap();
    assert_eq!(editor.cursor(), 4);
    editor.apply(EditAction::PageUp).unwrap();
    assert_eq!(editor.cursor(), 0);
}

#[test]
fn test_move_up_lands_on_line_start() {
    let mut editor = open(&[0x41, 0x42, 0x43, LINEBREAK, 0x44, 0x45]);
    press(&mut editor, EditAction::MoveRight, 6);
    assert_eq!(editor.cursor(), 6);
    editor.apply(EditAction::MoveUp).unwrap();
    assert_eq!(editor.cursor(), 0);
    editor.apply(EditAction::MoveDown).unwrap();
    assert_eq!(editor.cursor(), 4);
}

#[test]
fn test_program_call_run() {
    let mut editor = ProgramEditor::new(no_autosave());
    editor
        .apply(EditAction::InsertRun(prgm_call(b"HELLO")))
        .unwrap();
    assert_eq!(editor.document().len(), 6);
    assert_eq!(editor.cursor(), 6);

    editor.apply(EditAction::Undo).unwrap();
    assert!(editor.document().is_empty());
}

#[test]
fn test_autosave_requests() {
    let config = EditorConfig {
        autosave_every_edits: 3,
        ..EditorConfig::default()
    };
    let mut store = MemoryStore::new();
    let mut editor = ProgramEditor::open(&mut store, config).unwrap();

    let insert = EditAction::InsertToken(Token::single(0x41));
    assert_eq!(editor.apply(insert.clone()).unwrap(), EditOutcome::Changed);
    assert_eq!(editor.apply(EditAction::MoveLeft).unwrap(), EditOutcome::Changed);
    assert_eq!(editor.apply(insert.clone()).unwrap(), EditOutcome::Changed);
    assert_eq!(editor.apply(insert.clone()).unwrap(), EditOutcome::RequestSave);

    editor.save(&mut store).unwrap();
    assert!(!editor.is_dirty());
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.load().unwrap(), Some(vec![0x41, 0x41, 0x41]));

    assert_eq!(editor.apply(insert).unwrap(), EditOutcome::Changed);
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("AETHER.8xp"));

    let mut editor = ProgramEditor::open(&mut store, no_autosave()).unwrap();
    assert!(editor.document().is_empty());
    type_bytes(&mut editor, &[0x41, LINEBREAK, 0x42]);
    editor
        .apply(EditAction::InsertToken(Token::from_catalog(0xB0BB)))
        .unwrap();
    editor.save(&mut store).unwrap();

    let reopened = ProgramEditor::open(&mut store, no_autosave()).unwrap();
    assert_eq!(reopened.document().as_bytes(), &[0x41, LINEBREAK, 0x42, 0xBB, 0xB0]);
    assert_eq!(reopened.cursor(), 0);
    assert_eq!(reopened.document().undo_depth(), 0);
    assert!(!reopened.is_dirty());
    assert_eq!(line_starts(&reopened), [0, 2]);
}

#[test]
fn test_corrupt_store_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("BROKEN.8xp");
    std::fs::write(&path, [0x41u8, 0x42, 9, 0]).unwrap();

    let mut store = FileStore::new(path);
    let err = ProgramEditor::open(&mut store, no_autosave()).err().unwrap();
    assert!(matches!(err, EditorError::Store(_)));
}

#[test]
fn test_full_buffer_rejects_insert() {
    let mut editor = open(&vec![0x41; PROGRAM_CAPACITY]);
    let err = editor
        .apply(EditAction::InsertToken(Token::single(0x42)))
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Capacity(CapacityError::BufferFull {
            requested: 1,
            available: 0
        })
    ));
    assert_eq!(editor.document().len(), PROGRAM_CAPACITY);
    assert!(!editor.is_dirty());
}

#[test]
fn test_full_line_index_rejects_newline() {
    let mut editor = open(&vec![LINEBREAK; LINE_CAPACITY - 1]);
    let err = editor.apply(EditAction::Newline).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Capacity(CapacityError::LineIndexFull { .. })
    ));
    assert_eq!(editor.document().line_count(), LINE_CAPACITY);
}

#[test]
fn test_replay_is_deterministic() {
    let actions = vec![
        EditAction::InsertToken(Token::single(WHILE)),
        EditAction::Newline,
        EditAction::InsertToken(Token::from_catalog(0xB1BB)),
        EditAction::ToggleSelection,
        EditAction::MoveLeft,
        EditAction::Copy,
        EditAction::MoveDown,
        EditAction::Paste,
        EditAction::Undo,
    ];
    let run = |actions: &[EditAction]| {
        let mut editor = ProgramEditor::new(no_autosave());
        for action in actions {
            editor.apply(action.clone()).unwrap();
        }
        editor.snapshot()
    };

    let first = run(&actions[..]);
    let second = run(&actions[..]);
    assert_eq!(first, second);
    assert_eq!(first.hash(), second.hash());

    let mut longer = actions.clone();
    longer.push(EditAction::Redo);
    assert_ne!(run(&longer[..]).hash(), first.hash());
}

#[test]
fn test_cut_paste_with_lead_valued_tails() {
    let program = [0xEF, 0x5C, 0x41, 0xBB, 0xB0, LINEBREAK, 0xEF, 0xBB];
    let mut store = MemoryStore::with_program(&program).unwrap();
    let mut editor = ProgramEditor::open(&mut store, no_autosave()).unwrap();

    editor.apply(EditAction::ToggleSelection).unwrap();
    editor.apply(EditAction::MoveRight).unwrap();
    editor.apply(EditAction::MoveRight).unwrap();
    assert_eq!(editor.cursor(), 3);
    assert_eq!(editor.apply(EditAction::Cut).unwrap(), EditOutcome::Changed);
    assert_eq!(editor.clipboard(), &[0xEF, 0x5C, 0x41, 0xBB, 0xB0]);
    assert_eq!(editor.document().as_bytes(), &[LINEBREAK, 0xEF, 0xBB]);
    assert_eq!(editor.cursor(), 0);

    editor.apply(EditAction::MoveDown).unwrap();
    assert_eq!(editor.cursor(), 1);
    editor.apply(EditAction::MoveRight).unwrap();
    assert_eq!(editor.cursor(), 3);
    editor.apply(EditAction::Paste).unwrap();
    assert_eq!(
        editor.document().as_bytes(),
        &[LINEBREAK, 0xEF, 0xBB, 0xEF, 0x5C, 0x41, 0xBB, 0xB0]
    );
    assert_eq!(editor.cursor(), 8);
    editor.apply(EditAction::MoveLeft).unwrap();
    assert_eq!(editor.cursor(), 6);
    editor.apply(EditAction::MoveLeft).unwrap();
    assert_eq!(editor.cursor(), 5);
    editor.apply(EditAction::MoveLeft).unwrap();
    assert_eq!(editor.cursor(), 3);
}

/// Any token except a 2-byte one ending in a line break byte, which the
/// byte-based line index would read as the end of a line.
fn arb_token() -> impl Strategy<Value = Token> {
    let tail = any::<u8>().prop_filter("tail", |b| *b != LINEBREAK);
    prop_oneof![
        3 => any::<u8>()
            .prop_filter("single", |b| !is_two_byte_lead(*b))
            .prop_map(Token::single),
        1 => (prop::sample::select(TWO_BYTE_LEADS.to_vec()), tail)
            .prop_map(|(lead, tail)| Token::double(lead, tail)),
    ]
}

fn arb_action() -> impl Strategy<Value = EditAction> {
    prop_oneof![
        4 => arb_token().prop_map(EditAction::InsertToken),
        2 => Just(EditAction::Newline),
        2 => Just(EditAction::Delete),
        1 => Just(EditAction::ToggleSelection),
        1 => Just(EditAction::Copy),
        1 => Just(EditAction::Cut),
        1 => Just(EditAction::Paste),
        1 => Just(EditAction::ClearLine),
        2 => Just(EditAction::MoveLeft),
        2 => Just(EditAction::MoveRight),
        1 => Just(EditAction::MoveUp),
        1 => Just(EditAction::MoveDown),
        1 => Just(EditAction::Undo),
        1 => Just(EditAction::Redo),
    ]
}

proptest! {
    /// Any session keeps the cursor in range and can be undone back to the
    /// program it opened
    #[test]
    fn sessions_undo_back_to_opened_program(
        initial in prop::collection::vec(arb_token(), 0..20),
        actions in prop::collection::vec(arb_action(), 0..30),
    ) {
        let initial: Vec<u8> = initial.iter().flat_map(|t| t.as_bytes().to_vec()).collect();
        // A small clipboard keeps the whole history inside one undo log
        let config = EditorConfig {
            clipboard_capacity: 8,
            ..no_autosave()
        };
        let mut store = MemoryStore::with_program(&initial).unwrap();
        let mut editor = ProgramEditor::open(&mut store, config).unwrap();

        for action in actions {
            editor.apply(action).unwrap();
            let document = editor.document();
            let cursor = editor.cursor();
            prop_assert!(
                cursor == document.len()
                    || token_starts(document.as_bytes()).any(|(start, _)| start == cursor),
                "cursor {} is not on a token start",
                cursor
            );
            let breaks = document.as_bytes().iter().filter(|b| **b == LINEBREAK).count();
            prop_assert_eq!(document.line_count(), breaks + 1);
        }

        while editor.document().undo_depth() > 0 {
            editor.apply(EditAction::Undo).unwrap();
        }
        prop_assert_eq!(editor.document().as_bytes(), &initial[..]);
    }
}
