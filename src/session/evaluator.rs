use crate::passage::markup::AnnotatedChar;
use crate::session::input::PassageSheet;

/// Glyph shown for an unrevealed hidden character.
pub const DEFAULT_PLACEHOLDER: char = '_';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorClass {
    Untyped,
    HiddenCorrect,
    VisibleCorrect,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub display: char,
    pub color: ColorClass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealPolicy {
    pub reveal_hidden: bool,
    pub placeholder: char,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self {
            reveal_hidden: false,
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }
}

/// What one passage position looks like on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellView {
    pub display: char,
    pub color: ColorClass,
    pub is_cursor: bool,
}

pub fn classify(expected: AnnotatedChar, typed: Option<char>, policy: RevealPolicy) -> Classification {
    match typed {
        None => Classification {
            display: if policy.reveal_hidden || !expected.hidden {
                expected.ch
            } else {
                policy.placeholder
            },
            color: ColorClass::Untyped,
        },
        Some(ch) if ch == expected.ch => Classification {
            display: expected.ch,
            color: if expected.hidden {
                ColorClass::HiddenCorrect
            } else {
                ColorClass::VisibleCorrect
            },
        },
        // Show what was typed; the expected glyph would give a hidden answer away.
        Some(ch) => Classification {
            display: ch,
            color: ColorClass::Incorrect,
        },
    }
}

pub fn cells(sheet: &PassageSheet, policy: RevealPolicy) -> Vec<CellView> {
    let cursor = sheet.cursor.position();
    sheet
        .chars
        .iter()
        .enumerate()
        .map(|(i, &expected)| {
            let c = classify(expected, sheet.typed(i), policy);
            CellView {
                display: c.display,
                color: c.color,
                is_cursor: i == cursor,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub untyped: usize,
    pub hidden_correct: usize,
    pub visible_correct: usize,
    pub incorrect: usize,
}

impl Tally {
    pub fn of(sheet: &PassageSheet) -> Self {
        let mut tally = Tally::default();
        for (i, &expected) in sheet.chars.iter().enumerate() {
            match classify(expected, sheet.typed(i), RevealPolicy::default()).color {
                ColorClass::Untyped => tally.untyped += 1,
                ColorClass::HiddenCorrect => tally.hidden_correct += 1,
                ColorClass::VisibleCorrect => tally.visible_correct += 1,
                ColorClass::Incorrect => tally.incorrect += 1,
            }
        }
        tally
    }

    pub fn correct(&self) -> usize {
        self.hidden_correct + self.visible_correct
    }

    pub fn typed(&self) -> usize {
        self.correct() + self.incorrect
    }

    pub fn accuracy(&self) -> f64 {
        let typed = self.typed();
        if typed == 0 {
            return 100.0;
        }
        (self.correct() as f64 / typed as f64) * 100.0
    }

    pub fn is_solved(&self) -> bool {
        self.untyped == 0 && self.incorrect == 0
    }
}
