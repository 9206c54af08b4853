use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::event::{AppEvent, TimerTicker};
use crate::passage::{PassageCatalog, PassageId};
use crate::session::clock::{Clock, SystemClock};
use crate::session::timer::{Generation, TickOutcome, parse_minutes};
use crate::session::{EditKey, SessionCoordinator};
use crate::ui::components::passage_menu::MenuState;
use crate::ui::components::typing_area::{ClickResolver, SurfaceMap, TypingArea};
use crate::ui::layout::AppLayout;
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

const TIMER_PERIOD: Duration = Duration::from_secs(1);
const COUNTDOWN_INPUT_MAX: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Typing,
    PassagePicker,
    CountdownPrompt,
}

/// Map a key press on the typing surface to an edit. Enter and Tab type the
/// characters they stand for.
pub fn edit_key_for(key: &KeyEvent) -> Option<EditKey> {
    let ctrl_alt = KeyModifiers::CONTROL | KeyModifiers::ALT;
    // Windows reports AltGr as Ctrl+Alt, so that pair still types characters.
    let alt_gr = key.modifiers.contains(ctrl_alt) && matches!(key.code, KeyCode::Char(_));
    if key.modifiers.intersects(ctrl_alt) && !alt_gr {
        return None;
    }
    match key.code {
        KeyCode::Char(ch) => Some(EditKey::Char(ch)),
        KeyCode::Enter => Some(EditKey::Char('\n')),
        KeyCode::Tab => Some(EditKey::Char('\t')),
        KeyCode::Backspace => Some(EditKey::Backspace),
        KeyCode::Delete => Some(EditKey::Delete),
        KeyCode::Left => Some(EditKey::Left),
        KeyCode::Right => Some(EditKey::Right),
        _ => None,
    }
}

pub struct App {
    pub screen: AppScreen,
    pub session: SessionCoordinator,
    pub config: Config,
    pub theme: Theme,
    pub menu: MenuState,
    pub countdown_input: LineInput,
    pub countdown_error: Option<String>,
    /// One-line notice shown in the header until the next edit.
    pub notice: Option<String>,
    /// Terminal area of the last frame; click resolution lays out against it.
    pub frame_area: Rect,
    pub should_quit: bool,
    ticker: TimerTicker,
}

impl App {
    pub fn new(config: Config, catalog: PassageCatalog, theme: Theme, tx: mpsc::Sender<AppEvent>) -> Self {
        Self::with_clock(config, catalog, theme, tx, Box::new(SystemClock))
    }

    pub fn with_clock(
        config: Config,
        catalog: PassageCatalog,
        theme: Theme,
        tx: mpsc::Sender<AppEvent>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut session = SessionCoordinator::new(catalog, clock);
        session.set_reveal_hidden(config.reveal_hidden);
        session.set_speed_tracking(config.track_speed);
        session.set_placeholder(config.placeholder);

        let countdown_input = LineInput::new(&config.countdown_minutes.to_string(), COUNTDOWN_INPUT_MAX);

        Self {
            screen: AppScreen::Typing,
            session,
            config,
            theme,
            menu: MenuState::default(),
            countdown_input,
            countdown_error: None,
            notice: None,
            frame_area: Rect::default(),
            should_quit: false,
            ticker: TimerTicker::new(tx, TIMER_PERIOD),
        }
    }

    /// Keep the one-second ticker aligned with the session timer. Called after
    /// every handled event.
    pub fn sync_ticker(&mut self) {
        self.ticker
            .sync(self.session.timer_active(), self.session.timer_generation());
    }

    pub fn ticker_generation(&self) -> Option<Generation> {
        self.ticker.generation()
    }

    pub fn type_key(&mut self, key: EditKey) {
        self.notice = None;
        self.session.handle_key(key);
    }

    pub fn on_timer_tick(&mut self, generation: Generation) {
        if self.session.tick(generation) == TickOutcome::Expired {
            self.notice = Some(format!("Time's up! {} WPM", self.session.current_wpm()));
        }
    }

    /// Place the caret from a left click at terminal coordinates.
    pub fn click(&mut self, column: u16, row: u16) {
        if self.screen != AppScreen::Typing {
            return;
        }
        let main = AppLayout::new(self.frame_area).main;
        let map = SurfaceMap::new(
            &self.session.sheet().chars,
            TypingArea::text_area(main),
            self.session.cursor(),
        );
        if let Some(pos) = map.resolve_click_to_position(column, row) {
            self.session.click(pos);
        }
    }

    pub fn toggle_hints(&mut self) {
        self.session.toggle_reveal();
    }

    pub fn toggle_speed_tracking(&mut self) {
        let on = !self.session.speed_tracking();
        self.session.set_speed_tracking(on);
        self.notice = Some(format!("Speed tracking {}", if on { "on" } else { "off" }));
    }

    pub fn reset_timer(&mut self) {
        self.notice = None;
        self.session.reset_timer();
    }

    pub fn open_picker(&mut self) {
        self.menu = MenuState::new(self.session.active_id().0);
        self.screen = AppScreen::PassagePicker;
    }

    pub fn picker_next(&mut self) {
        self.menu.next(self.session.catalog().len());
    }

    pub fn picker_prev(&mut self) {
        self.menu.prev(self.session.catalog().len());
    }

    pub fn confirm_picker(&mut self) {
        self.select_passage(self.menu.selected_id());
        self.screen = AppScreen::Typing;
    }

    pub fn select_passage(&mut self, id: PassageId) {
        self.notice = None;
        if let Err(err) = self.session.select(id) {
            warn!(%err, "passage selection failed");
        }
    }

    /// Select a passage by its textual id, as given on the command line.
    pub fn select_passage_by_name(&mut self, name: &str) -> bool {
        match self.session.catalog().find_by_id(name) {
            Some(id) => {
                self.select_passage(id);
                true
            }
            None => {
                warn!(passage = name, "unknown passage id");
                false
            }
        }
    }

    pub fn open_countdown_prompt(&mut self) {
        self.countdown_input = LineInput::new(&self.config.countdown_minutes.to_string(), COUNTDOWN_INPUT_MAX);
        self.countdown_error = None;
        self.screen = AppScreen::CountdownPrompt;
    }

    pub fn handle_countdown_key(&mut self, key: KeyEvent) {
        match self.countdown_input.handle(key) {
            InputResult::Continue => self.countdown_error = None,
            InputResult::Cancel => self.screen = AppScreen::Typing,
            InputResult::Submit => {
                let value = self.countdown_input.value().to_string();
                if self.start_countdown(&value) {
                    self.screen = AppScreen::Typing;
                }
            }
        }
    }

    /// Start a countdown from user text. Invalid input keeps the timer as it
    /// was and leaves the reason in `countdown_error`.
    pub fn start_countdown(&mut self, input: &str) -> bool {
        match self.session.start_countdown(input) {
            Ok(()) => {
                if let Ok(minutes) = parse_minutes(input) {
                    self.config.countdown_minutes = minutes;
                }
                self.countdown_error = None;
                self.notice = None;
                true
            }
            Err(err) => {
                self.countdown_error = Some(err.to_string());
                false
            }
        }
    }

    /// Write the runtime toggles back to the config file.
    pub fn persist_settings(&mut self) -> anyhow::Result<()> {
        self.config.reveal_hidden = self.session.reveal_hidden();
        self.config.track_speed = self.session.speed_tracking();
        self.config.save()?;
        info!("settings saved");
        Ok(())
    }

    pub fn quit(&mut self) {
        debug!(screen = ?self.screen, "quit requested");
        self.ticker.stop();
        self.should_quit = true;
    }
}
