use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

use crate::passage::{Passage, PassageCatalog, PassageId};
use crate::session::clock::Clock;
use crate::session::evaluator::{self, CellView, RevealPolicy, Tally};
use crate::session::input::{self, EditKey, PassageSheet};
use crate::session::timer::{CountdownError, Generation, SpeedSample, TickOutcome, TimerState, TimingEngine};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no passage {0} in the catalog")]
    UnknownPassage(PassageId),
}

/// Owns every per-passage sheet and the single session timer. The UI layer
/// only ever goes through this type.
pub struct SessionCoordinator {
    catalog: PassageCatalog,
    active: PassageId,
    sheet: PassageSheet,
    /// Sheets of passages visited earlier, kept while another one is active.
    parked: HashMap<PassageId, PassageSheet>,
    timer: TimingEngine,
    policy: RevealPolicy,
    clock: Box<dyn Clock>,
}

impl SessionCoordinator {
    /// Start on the first passage of the catalog.
    pub fn new(catalog: PassageCatalog, clock: Box<dyn Clock>) -> Self {
        let sheet = PassageSheet::new(catalog.get(PassageId(0)).map_or("", |p| p.content.as_str()));
        Self {
            catalog,
            active: PassageId(0),
            sheet,
            parked: HashMap::new(),
            timer: TimingEngine::default(),
            policy: RevealPolicy::default(),
            clock,
        }
    }

    /// Switch passages. Progress on a previously visited passage is kept; the
    /// timer and speed history always start over.
    pub fn select(&mut self, id: PassageId) -> Result<(), SessionError> {
        let Some(passage) = self.catalog.get(id) else {
            return Err(SessionError::UnknownPassage(id));
        };
        if id != self.active {
            let next = self
                .parked
                .remove(&id)
                .unwrap_or_else(|| PassageSheet::new(&passage.content));
            let previous = std::mem::replace(&mut self.sheet, next);
            self.parked.insert(self.active, previous);
            self.active = id;
        }
        self.timer.stop();
        info!(passage = %id, resumed = !self.sheet.ledger.is_empty(), "passage selected");
        Ok(())
    }

    pub fn catalog(&self) -> &PassageCatalog {
        &self.catalog
    }

    pub fn active_id(&self) -> PassageId {
        self.active
    }

    pub fn active_passage(&self) -> Option<&Passage> {
        self.catalog.get(self.active)
    }

    pub fn sheet(&self) -> &PassageSheet {
        &self.sheet
    }

    pub fn handle_key(&mut self, key: EditKey) {
        if let EditKey::Char(_) = key {
            let now = self.clock.now_ms();
            self.timer.on_keystroke(now);
        }
        input::process_key(&mut self.sheet, key);
    }

    /// Caret placement from a pointer, already resolved to a passage position.
    pub fn click(&mut self, position: usize) {
        input::process_click(&mut self.sheet, position);
    }

    pub fn reveal_hidden(&self) -> bool {
        self.policy.reveal_hidden
    }

    pub fn set_reveal_hidden(&mut self, on: bool) {
        self.policy.reveal_hidden = on;
    }

    pub fn toggle_reveal(&mut self) {
        self.policy.reveal_hidden = !self.policy.reveal_hidden;
    }

    pub fn set_placeholder(&mut self, placeholder: char) {
        self.policy.placeholder = placeholder;
    }

    pub fn speed_tracking(&self) -> bool {
        self.timer.track_speed()
    }

    pub fn set_speed_tracking(&mut self, on: bool) {
        self.timer.set_track_speed(on);
    }

    /// Invalid input leaves the timer as it was; the caller decides whether to tell the user.
    pub fn start_countdown(&mut self, minutes: &str) -> Result<(), CountdownError> {
        let now = self.clock.now_ms();
        self.timer.start_countdown_from_input(minutes, now)
    }

    pub fn reset_timer(&mut self) {
        let now = self.clock.now_ms();
        self.timer.reset(now);
    }

    pub fn tick(&mut self, generation: Generation) -> TickOutcome {
        let now = self.clock.now_ms();
        let typed = self.sheet.ledger.typed_count();
        self.timer.tick(generation, now, typed)
    }

    pub fn timer_generation(&self) -> Generation {
        self.timer.generation()
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Elapsed seconds, or remaining seconds during a countdown.
    pub fn elapsed_secs(&self) -> u64 {
        self.timer.display_secs()
    }

    pub fn current_wpm(&self) -> u32 {
        self.timer.current_wpm(self.sheet().ledger.typed_count())
    }

    pub fn speed_history(&self) -> &[SpeedSample] {
        self.timer.history()
    }

    pub fn cells(&self) -> Vec<CellView> {
        evaluator::cells(self.sheet(), self.policy)
    }

    pub fn cursor(&self) -> usize {
        self.sheet().cursor.position()
    }

    /// Whether the caret sits in the slot after the last character.
    pub fn caret_at_end(&self) -> bool {
        self.sheet().cursor.is_at_end()
    }

    pub fn tally(&self) -> Tally {
        Tally::of(self.sheet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::ManualClock;
    use crate::session::evaluator::ColorClass;

    fn catalog() -> PassageCatalog {
        let passages = [("a", "ab{cd}"), ("b", "xyz"), ("c", "")]
            .iter()
            .map(|(id, content)| Passage {
                id: id.to_string(),
                title: id.to_string(),
                content: content.to_string(),
            })
            .collect();
        PassageCatalog::new(passages, "test").unwrap()
    }

    fn coordinator() -> (SessionCoordinator, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (SessionCoordinator::new(catalog(), Box::new(clock.clone())), clock)
    }

    fn type_str(c: &mut SessionCoordinator, s: &str) {
        for ch in s.chars() {
            c.handle_key(EditKey::Char(ch));
        }
    }

    #[test]
    fn test_starts_on_first_passage_idle() {
        let (c, _) = coordinator();
        assert_eq!(c.active_id(), PassageId(0));
        assert_eq!(c.timer_state(), TimerState::Idle);
        assert_eq!(c.cells().len(), 4);
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn test_unknown_passage_rejected() {
        let (mut c, _) = coordinator();
        assert_eq!(c.select(PassageId(9)), Err(SessionError::UnknownPassage(PassageId(9))));
        assert_eq!(c.active_id(), PassageId(0));
    }

    #[test]
    fn test_first_char_starts_stopwatch() {
        let (mut c, _) = coordinator();
        c.handle_key(EditKey::Right);
        assert_eq!(c.timer_state(), TimerState::Idle);
        c.handle_key(EditKey::Char('b'));
        assert_eq!(c.timer_state(), TimerState::Running { started_at_ms: 1_000_000 });
    }

    #[test]
    fn test_switch_preserves_ledger_and_resets_timer() {
        let (mut c, clock) = coordinator();
        type_str(&mut c, "ab");
        clock.advance_secs(1);
        let g = c.timer_generation();
        c.tick(g);
        assert_eq!(c.speed_history().len(), 1);

        c.select(PassageId(1)).unwrap();
        assert_eq!(c.timer_state(), TimerState::Idle);
        assert!(c.speed_history().is_empty());
        assert_eq!(c.cursor(), 0);
        type_str(&mut c, "x");

        c.select(PassageId(0)).unwrap();
        assert_eq!(c.cursor(), 2);
        assert_eq!(c.sheet().typed(0), Some('a'));
        assert_eq!(c.sheet().typed(1), Some('b'));
        assert_eq!(c.timer_state(), TimerState::Idle);
        assert!(c.speed_history().is_empty());

        // Old generation's ticks are dead after the switch.
        assert_eq!(c.tick(g), TickOutcome::Stale);
    }

    #[test]
    fn test_reselecting_active_passage_resets_timer_only() {
        let (mut c, _) = coordinator();
        type_str(&mut c, "a");
        c.select(PassageId(0)).unwrap();
        assert_eq!(c.timer_state(), TimerState::Idle);
        assert_eq!(c.sheet().typed(0), Some('a'));
    }

    #[test]
    fn test_tick_uses_active_ledger_count() {
        let (mut c, clock) = coordinator();
        type_str(&mut c, "abcd");
        clock.advance_secs(60);
        c.tick(c.timer_generation());
        // 4 chars over one minute.
        assert_eq!(c.speed_history().last().map(|s| s.wpm), Some(1));
        assert_eq!(c.elapsed_secs(), 60);
        c.handle_key(EditKey::Backspace);
        c.handle_key(EditKey::Backspace);
        clock.advance_secs(1);
        c.tick(c.timer_generation());
        assert_eq!(c.speed_history().last().map(|s| s.wpm), Some(0));
    }

    #[test]
    fn test_countdown_via_input() {
        let (mut c, clock) = coordinator();
        assert!(c.start_countdown("nope").is_err());
        assert_eq!(c.timer_state(), TimerState::Idle);
        c.start_countdown("1").unwrap();
        assert_eq!(c.elapsed_secs(), 60);
        let g = c.timer_generation();
        clock.advance_secs(30);
        assert_eq!(c.tick(g), TickOutcome::Applied);
        assert_eq!(c.elapsed_secs(), 30);
        clock.advance_secs(30);
        assert_eq!(c.tick(g), TickOutcome::Expired);
        assert_eq!(c.timer_state(), TimerState::Idle);
        assert_eq!(c.elapsed_secs(), 0);
    }

    #[test]
    fn test_wpm_kept_after_countdown_expires() {
        let (mut c, clock) = coordinator();
        c.start_countdown("1").unwrap();
        let g = c.timer_generation();
        type_str(&mut c, "abcd");
        clock.advance_secs(60);
        c.tick(g);
        assert_eq!(c.current_wpm(), 1);
    }

    #[test]
    fn test_reset_restarts_running() {
        let (mut c, clock) = coordinator();
        c.start_countdown("2").unwrap();
        clock.advance_secs(5);
        c.reset_timer();
        assert_eq!(c.timer_state(), TimerState::Running { started_at_ms: 1_005_000 });
        assert!(c.speed_history().is_empty());
    }

    #[test]
    fn test_reveal_toggle_affects_untyped_hidden_only() {
        let (mut c, _) = coordinator();
        assert_eq!(c.cells()[2].display, '_');
        c.toggle_reveal();
        assert_eq!(c.cells()[2].display, 'c');
        assert_eq!(c.cells()[2].color, ColorClass::Untyped);
        c.toggle_reveal();
        c.set_placeholder('·');
        assert_eq!(c.cells()[3].display, '·');
    }

    #[test]
    fn test_click_and_caret_slot() {
        let (mut c, _) = coordinator();
        c.click(100);
        assert_eq!(c.cursor(), 4);
        assert!(c.caret_at_end());
        c.handle_key(EditKey::Char('q'));
        assert_eq!(c.sheet().ledger.typed_count(), 0);
    }

    #[test]
    fn test_empty_passage_is_safe() {
        let (mut c, _) = coordinator();
        c.select(PassageId(2)).unwrap();
        c.handle_key(EditKey::Char('a'));
        c.handle_key(EditKey::Backspace);
        c.handle_key(EditKey::Delete);
        c.handle_key(EditKey::Right);
        assert!(c.cells().is_empty());
        assert_eq!(c.cursor(), 0);
        assert!(c.tally().is_solved());
    }

    #[test]
    fn test_speed_tracking_toggle() {
        let (mut c, clock) = coordinator();
        c.set_speed_tracking(false);
        type_str(&mut c, "a");
        clock.advance_secs(1);
        c.tick(c.timer_generation());
        assert!(c.speed_history().is_empty());
        assert!(!c.speed_tracking());
    }
}
