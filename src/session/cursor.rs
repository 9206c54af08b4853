/// Caret position within one passage, always in `0..=len`.
///
/// `len` itself is the slot after the last character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorController {
    pos: usize,
    len: usize,
}

impl CursorController {
    pub fn new(len: usize) -> Self {
        Self { pos: 0, len }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.len
    }

    pub fn move_left(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.pos = (self.pos + 1).min(self.len);
    }

    /// Place the caret, clamping anything past the end to the end slot.
    pub fn set(&mut self, pos: usize) {
        self.pos = pos.min(self.len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let cursor = CursorController::new(4);
        assert_eq!(cursor.position(), 0);
        assert!(!cursor.is_at_end());
    }

    #[test]
    fn test_move_clamps_both_ends() {
        let mut cursor = CursorController::new(2);
        cursor.move_left();
        assert_eq!(cursor.position(), 0);
        cursor.move_right();
        cursor.move_right();
        cursor.move_right();
        assert_eq!(cursor.position(), 2);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_set_clamps() {
        let mut cursor = CursorController::new(5);
        cursor.set(3);
        assert_eq!(cursor.position(), 3);
        cursor.set(99);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_empty_passage() {
        let mut cursor = CursorController::new(0);
        cursor.move_right();
        assert_eq!(cursor.position(), 0);
        assert!(cursor.is_at_end());
    }
}
