use crate::passage::markup::{self, AnnotatedChar};
use crate::session::cursor::CursorController;
use crate::session::ledger::InputLedger;

/// Keys the typing surface understands. Everything else is ignored upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
}

/// Per-passage typing state: the parsed passage plus what has been typed over it.
#[derive(Clone, Debug)]
pub struct PassageSheet {
    pub chars: Vec<AnnotatedChar>,
    pub ledger: InputLedger,
    pub cursor: CursorController,
}

impl PassageSheet {
    pub fn new(raw: &str) -> Self {
        Self::from_chars(markup::parse(raw))
    }

    pub fn from_chars(chars: Vec<AnnotatedChar>) -> Self {
        let len = chars.len();
        Self {
            chars,
            ledger: InputLedger::new(len),
            cursor: CursorController::new(len),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn expected(&self, pos: usize) -> Option<AnnotatedChar> {
        self.chars.get(pos).copied()
    }

    pub fn typed(&self, pos: usize) -> Option<char> {
        self.ledger.get(pos)
    }
}

/// Overwrite the slot under the caret and advance. Returns false when the caret
/// sits past the last character, in which case the input is dropped.
pub fn process_char(sheet: &mut PassageSheet, ch: char) -> bool {
    let pos = sheet.cursor.position();
    let stored = sheet.ledger.set(pos, ch);
    if stored {
        sheet.cursor.move_right();
    }
    stored
}

pub fn process_backspace(sheet: &mut PassageSheet) {
    let pos = sheet.cursor.position();
    if pos > 0 {
        sheet.ledger.clear(pos - 1);
        sheet.cursor.set(pos - 1);
    }
}

pub fn process_delete(sheet: &mut PassageSheet) {
    let pos = sheet.cursor.position();
    if pos < sheet.len() {
        sheet.ledger.clear(pos);
    }
}

pub fn process_key(sheet: &mut PassageSheet, key: EditKey) {
    match key {
        EditKey::Char(ch) => {
            process_char(sheet, ch);
        }
        EditKey::Backspace => process_backspace(sheet),
        EditKey::Delete => process_delete(sheet),
        EditKey::Left => sheet.cursor.move_left(),
        EditKey::Right => sheet.cursor.move_right(),
    }
}

/// Place the caret from a pointer click.
pub fn process_click(sheet: &mut PassageSheet, pos: usize) {
    sheet.cursor.set(pos);
}
