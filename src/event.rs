use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, MouseEvent};

use crate::session::timer::Generation;

pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Redraw cadence for the UI.
    Tick,
    /// One-second session timer tick, stamped with the generation that scheduled it.
    TimerTick(Generation),
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
                        Ok(Event::Mouse(mouse)) => Some(AppEvent::Mouse(mouse)),
                        Ok(Event::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                        _ => None,
                    };
                    if let Some(ev) = forwarded {
                        if input_tx.send(ev).is_err() {
                            return;
                        }
                    }
                } else if input_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

struct Schedule {
    generation: Generation,
    cancelled: Arc<AtomicBool>,
}

/// Fixed-period ticker for the session timer. At most one schedule runs at a
/// time; starting a new one cancels the old one.
pub struct TimerTicker {
    tx: mpsc::Sender<AppEvent>,
    period: Duration,
    current: Option<Schedule>,
}

impl TimerTicker {
    pub fn new(tx: mpsc::Sender<AppEvent>, period: Duration) -> Self {
        Self {
            tx,
            period,
            current: None,
        }
    }

    pub fn generation(&self) -> Option<Generation> {
        self.current.as_ref().map(|s| s.generation)
    }

    pub fn start(&mut self, generation: Generation) {
        self.stop();

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();
        let period = self.period;

        thread::spawn(move || {
            let mut next = Instant::now() + period;
            loop {
                thread::sleep(next.saturating_duration_since(Instant::now()));
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                if tx.send(AppEvent::TimerTick(generation)).is_err() {
                    return;
                }
                next += period;
            }
        });

        self.current = Some(Schedule {
            generation,
            cancelled,
        });
    }

    pub fn stop(&mut self) {
        if let Some(schedule) = self.current.take() {
            schedule.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// Match the schedule to the engine: tick only while its timer is active,
    /// and always under its current generation.
    pub fn sync(&mut self, active: bool, generation: Generation) {
        if !active {
            self.stop();
        } else if self.generation() != Some(generation) {
            self.start(generation);
        }
    }
}

impl Drop for TimerTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
