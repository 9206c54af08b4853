use std::collections::BTreeMap;

/// Sparse record of what the user typed at each passage position.
///
/// Positions never shift: writing replaces a single slot and clearing removes
/// it entirely, so a cleared slot is indistinguishable from one never typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputLedger {
    len: usize,
    entries: BTreeMap<usize, char>,
}

impl InputLedger {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            entries: BTreeMap::new(),
        }
    }

    /// Number of storable positions; equals the passage length.
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Record `ch` at `pos`. Positions at or past the end are discarded.
    pub fn set(&mut self, pos: usize, ch: char) -> bool {
        if pos >= self.len {
            return false;
        }
        self.entries.insert(pos, ch);
        true
    }

    pub fn clear(&mut self, pos: usize) -> Option<char> {
        self.entries.remove(&pos)
    }

    pub fn get(&self, pos: usize) -> Option<char> {
        self.entries.get(&pos).copied()
    }

    /// Count of occupied slots, the character count WPM is computed from.
    pub fn typed_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.entries.iter().map(|(&pos, &ch)| (pos, ch))
    }
}
