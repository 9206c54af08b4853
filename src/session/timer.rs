use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountdownError {
    #[error("countdown minutes must be a whole number, got {0:?}")]
    NotANumber(String),
    #[error("countdown minutes must be positive")]
    NotPositive,
}

/// Token identifying one scheduled tick stream. Every start, reset or stop
/// bumps it so ticks from an earlier stream can be recognized and dropped.
pub type Generation = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { started_at_ms: i64 },
    CountingDown { ends_at_ms: i64 },
}

impl TimerState {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running { .. } => "running",
            TimerState::CountingDown { .. } => "countdown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedSample {
    pub second: u64,
    pub wpm: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Applied,
    /// Countdown reached zero on this tick; the timer is now idle.
    Expired,
    /// Tick belonged to a superseded generation or arrived while idle.
    Stale,
}

/// `round((chars / 5) / minutes)`, with minutes floored at one second.
pub fn compute_wpm(chars_typed: usize, elapsed_secs: f64) -> u32 {
    let minutes = (elapsed_secs / 60.0).max(1.0 / 60.0);
    ((chars_typed as f64 / 5.0) / minutes).round() as u32
}

pub fn parse_minutes(input: &str) -> Result<u32, CountdownError> {
    let trimmed = input.trim();
    let minutes: i64 = trimmed
        .parse()
        .map_err(|_| CountdownError::NotANumber(trimmed.to_string()))?;
    if minutes <= 0 {
        return Err(CountdownError::NotPositive);
    }
    u32::try_from(minutes).map_err(|_| CountdownError::NotANumber(trimmed.to_string()))
}

#[derive(Clone, Debug)]
pub struct TimingEngine {
    state: TimerState,
    generation: Generation,
    /// Elapsed seconds while running, remaining seconds while counting down.
    display_secs: u64,
    /// Seconds of typing time as of the last tick; survives countdown expiry.
    elapsed_secs: u64,
    countdown_secs: u64,
    track_speed: bool,
    history: Vec<SpeedSample>,
}

impl Default for TimingEngine {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TimingEngine {
    pub fn new(track_speed: bool) -> Self {
        Self {
            state: TimerState::Idle,
            generation: 0,
            display_secs: 0,
            elapsed_secs: 0,
            countdown_secs: 0,
            track_speed,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.state != TimerState::Idle
    }

    pub fn display_secs(&self) -> u64 {
        self.display_secs
    }

    pub fn history(&self) -> &[SpeedSample] {
        &self.history
    }

    pub fn track_speed(&self) -> bool {
        self.track_speed
    }

    pub fn set_track_speed(&mut self, on: bool) {
        self.track_speed = on;
    }

    /// Every new run starts with an empty speed history, so sample seconds
    /// stay strictly increasing.
    fn begin(&mut self, state: TimerState) {
        self.generation += 1;
        self.state = state;
        self.elapsed_secs = 0;
        self.history.clear();
    }

    /// First keystroke while idle starts the stopwatch.
    pub fn on_keystroke(&mut self, now_ms: i64) {
        if self.state == TimerState::Idle {
            self.begin(TimerState::Running { started_at_ms: now_ms });
            self.display_secs = 0;
            info!(generation = self.generation, "stopwatch started");
        }
    }

    /// Start (or supersede with) a countdown of `minutes`.
    pub fn start_countdown(&mut self, minutes: u32, now_ms: i64) -> Result<(), CountdownError> {
        if minutes == 0 {
            return Err(CountdownError::NotPositive);
        }
        let total_secs = u64::from(minutes) * 60;
        self.begin(TimerState::CountingDown {
            ends_at_ms: now_ms + (total_secs as i64) * 1000,
        });
        self.display_secs = total_secs;
        self.countdown_secs = total_secs;
        info!(generation = self.generation, minutes, "countdown started");
        Ok(())
    }

    pub fn start_countdown_from_input(&mut self, input: &str, now_ms: i64) -> Result<(), CountdownError> {
        let minutes = parse_minutes(input).inspect_err(|err| {
            debug!(%err, input, "countdown input rejected");
        })?;
        self.start_countdown(minutes, now_ms)
    }

    /// Clear speed history and restart the stopwatch from now, as one step.
    pub fn reset(&mut self, now_ms: i64) {
        self.display_secs = 0;
        self.begin(TimerState::Running { started_at_ms: now_ms });
        info!(generation = self.generation, "timer reset");
    }

    /// Drop to idle and forget history. Outstanding ticks become stale.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.state = TimerState::Idle;
        self.display_secs = 0;
        self.elapsed_secs = 0;
        self.history.clear();
    }

    /// Apply one scheduled tick. `typed_chars` is the active ledger's entry count.
    pub fn tick(&mut self, generation: Generation, now_ms: i64, typed_chars: usize) -> TickOutcome {
        if generation != self.generation {
            debug!(generation, current = self.generation, "stale tick dropped");
            return TickOutcome::Stale;
        }

        match self.state {
            TimerState::Idle => TickOutcome::Stale,
            TimerState::CountingDown { ends_at_ms } => {
                let remaining_ms = (ends_at_ms - now_ms).max(0);
                self.display_secs = (remaining_ms as u64).div_ceil(1000);
                self.elapsed_secs = self.countdown_secs.saturating_sub(self.display_secs);
                if remaining_ms == 0 {
                    self.state = TimerState::Idle;
                    info!(generation, "countdown expired");
                    TickOutcome::Expired
                } else {
                    TickOutcome::Applied
                }
            }
            TimerState::Running { started_at_ms } => {
                let elapsed = ((now_ms - started_at_ms).max(0) / 1000) as u64;
                self.display_secs = elapsed;
                self.elapsed_secs = elapsed;
                if self.track_speed {
                    self.history.push(SpeedSample {
                        second: elapsed,
                        wpm: compute_wpm(typed_chars, elapsed as f64),
                    });
                }
                TickOutcome::Applied
            }
        }
    }

    /// Seconds of typing time as of the last tick, for the on-demand WPM readout.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn current_wpm(&self, typed_chars: usize) -> u32 {
        if self.state == TimerState::Idle && self.elapsed_secs == 0 {
            return 0;
        }
        compute_wpm(typed_chars, self.elapsed_secs as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_wpm_formula() {
        assert_eq!(compute_wpm(50, 60.0), 10);
        assert_eq!(compute_wpm(0, 60.0), 0);
        assert_eq!(compute_wpm(25, 30.0), 10);
        // Rounds to nearest.
        assert_eq!(compute_wpm(13, 60.0), 3);
        assert_eq!(compute_wpm(14, 60.0), 3);
        assert_eq!(compute_wpm(13, 120.0), 1);
    }

    #[test]
    fn test_wpm_floor_at_zero_elapsed() {
        // 5 chars in "one second" => 1 word / (1/60 min) = 60 wpm.
        assert_eq!(compute_wpm(5, 0.0), 60);
        assert_eq!(compute_wpm(5, 1.0), 60);
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("3"), Ok(3));
        assert_eq!(parse_minutes(" 2 "), Ok(2));
        assert_eq!(parse_minutes("0"), Err(CountdownError::NotPositive));
        assert_eq!(parse_minutes("-4"), Err(CountdownError::NotPositive));
        assert!(matches!(parse_minutes("abc"), Err(CountdownError::NotANumber(_))));
        assert!(matches!(parse_minutes(""), Err(CountdownError::NotANumber(_))));
        assert!(matches!(parse_minutes("1.5"), Err(CountdownError::NotANumber(_))));
    }

    #[test]
    fn test_keystroke_starts_stopwatch_once() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let generation = timer.generation();
        assert_eq!(timer.state(), TimerState::Running { started_at_ms: T0 });
        timer.on_keystroke(T0 + 5_000);
        assert_eq!(timer.state(), TimerState::Running { started_at_ms: T0 });
        assert_eq!(timer.generation(), generation);
    }

    #[test]
    fn test_keystroke_ignored_during_countdown() {
        let mut timer = TimingEngine::default();
        timer.start_countdown(1, T0).unwrap();
        timer.on_keystroke(T0 + 10);
        assert!(matches!(timer.state(), TimerState::CountingDown { .. }));
    }

    #[test]
    fn test_running_tick_samples_wpm() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let g = timer.generation();
        assert_eq!(timer.tick(g, T0 + 1_000, 5), TickOutcome::Applied);
        assert_eq!(timer.tick(g, T0 + 60_000, 50), TickOutcome::Applied);
        assert_eq!(
            timer.history(),
            &[
                SpeedSample { second: 1, wpm: 60 },
                SpeedSample { second: 60, wpm: 10 },
            ]
        );
        assert_eq!(timer.display_secs(), 60);
        assert_eq!(timer.current_wpm(50), 10);
    }

    #[test]
    fn test_elapsed_is_floored() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let g = timer.generation();
        timer.tick(g, T0 + 2_999, 0);
        assert_eq!(timer.display_secs(), 2);
    }

    #[test]
    fn test_wpm_can_drop_after_deletions() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let g = timer.generation();
        timer.tick(g, T0 + 60_000, 50);
        timer.tick(g, T0 + 61_000, 20);
        let wpms: Vec<u32> = timer.history().iter().map(|s| s.wpm).collect();
        assert_eq!(wpms, vec![10, 4]);
    }

    #[test]
    fn test_no_samples_when_speed_tracking_off() {
        let mut timer = TimingEngine::new(false);
        timer.on_keystroke(T0);
        let g = timer.generation();
        timer.tick(g, T0 + 3_000, 10);
        assert!(timer.history().is_empty());
        assert_eq!(timer.display_secs(), 3);
    }

    #[test]
    fn test_reset_clears_history_and_restarts() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let old = timer.generation();
        timer.tick(old, T0 + 1_000, 5);
        timer.reset(T0 + 5_000);
        assert!(timer.history().is_empty());
        assert_eq!(timer.state(), TimerState::Running { started_at_ms: T0 + 5_000 });
        assert_eq!(timer.display_secs(), 0);
        assert_ne!(timer.generation(), old);
        assert_eq!(timer.tick(old, T0 + 6_000, 5), TickOutcome::Stale);
        assert!(timer.history().is_empty());
    }

    #[test]
    fn test_countdown_counts_down_and_expires_once() {
        let mut timer = TimingEngine::default();
        timer.start_countdown(1, T0).unwrap();
        let g = timer.generation();
        assert_eq!(timer.display_secs(), 60);

        for s in 1..60 {
            assert_eq!(timer.tick(g, T0 + s * 1_000, 0), TickOutcome::Applied);
            assert_eq!(timer.display_secs(), (60 - s) as u64);
        }
        assert_eq!(timer.tick(g, T0 + 60_000, 0), TickOutcome::Expired);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.display_secs(), 0);

        // Late ticks never push the display negative or expire twice.
        assert_eq!(timer.tick(g, T0 + 61_000, 0), TickOutcome::Stale);
        assert_eq!(timer.display_secs(), 0);
    }

    #[test]
    fn test_countdown_overshoot_holds_at_zero() {
        let mut timer = TimingEngine::default();
        timer.start_countdown(1, T0).unwrap();
        let g = timer.generation();
        assert_eq!(timer.tick(g, T0 + 90_000, 0), TickOutcome::Expired);
        assert_eq!(timer.display_secs(), 0);
    }

    #[test]
    fn test_countdown_does_not_sample_speed() {
        let mut timer = TimingEngine::default();
        timer.start_countdown(2, T0).unwrap();
        let g = timer.generation();
        timer.tick(g, T0 + 1_000, 40);
        assert!(timer.history().is_empty());
        assert_eq!(timer.elapsed_secs(), 1);
    }

    #[test]
    fn test_new_countdown_supersedes_old_ticks() {
        let mut timer = TimingEngine::default();
        timer.start_countdown(1, T0).unwrap();
        let first = timer.generation();
        timer.start_countdown(3, T0 + 10_000).unwrap();
        assert_eq!(timer.tick(first, T0 + 70_000, 0), TickOutcome::Stale);
        assert_eq!(timer.display_secs(), 180);
        assert!(matches!(timer.state(), TimerState::CountingDown { .. }));
    }

    #[test]
    fn test_invalid_countdown_leaves_state_untouched() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let before = (timer.state(), timer.generation());
        assert!(timer.start_countdown_from_input("zero", T0).is_err());
        assert!(timer.start_countdown_from_input("0", T0).is_err());
        assert!(timer.start_countdown(0, T0).is_err());
        assert_eq!((timer.state(), timer.generation()), before);
    }

    #[test]
    fn test_stop_invalidates_ticks() {
        let mut timer = TimingEngine::default();
        timer.on_keystroke(T0);
        let g = timer.generation();
        timer.tick(g, T0 + 1_000, 5);
        timer.stop();
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.history().is_empty());
        assert_eq!(timer.tick(g, T0 + 2_000, 5), TickOutcome::Stale);
    }

    #[test]
    fn test_keystroke_after_expiry_starts_stopwatch() {
        let mut timer = TimingEngine::default();
        timer.start_countdown(1, T0).unwrap();
        let g = timer.generation();
        timer.tick(g, T0 + 60_000, 0);
        timer.on_keystroke(T0 + 61_000);
        assert_eq!(timer.state(), TimerState::Running { started_at_ms: T0 + 61_000 });
    }

    #[test]
    fn test_current_wpm_idle_is_zero() {
        let timer = TimingEngine::default();
        assert_eq!(timer.current_wpm(100), 0);
    }

    #[test]
    fn test_new_run_starts_with_fresh_history() {
        let mut timer = TimingEngine::new(true);
        timer.on_keystroke(T0);
        for s in 1..=3 {
            timer.tick(timer.generation(), T0 + s * 1000, 1);
        }
        assert_eq!(timer.history().len(), 3);

        timer.start_countdown(1, T0 + 3_000).unwrap();
        assert!(timer.history().is_empty());
        let g = timer.generation();
        assert_eq!(timer.tick(g, T0 + 63_000, 1), TickOutcome::Expired);

        timer.on_keystroke(T0 + 64_000);
        timer.tick(timer.generation(), T0 + 65_000, 2);
        let seconds: Vec<u64> = timer.history().iter().map(|s| s.second).collect();
        assert_eq!(seconds, vec![1]);
    }
}
