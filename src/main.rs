mod app;
mod config;
mod event;
mod logging;
mod passage;
mod session;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};

use app::{App, AppScreen, edit_key_for};
use config::Config;
use event::{AppEvent, EventHandler};
use passage::PassageCatalog;
use session::timer::TimerState;
use ui::components::countdown_prompt::CountdownPrompt;
use ui::components::passage_menu::PassageMenu;
use ui::components::stats_sidebar::StatsSidebar;
use ui::components::typing_area::TypingArea;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "cloze", version, about = "Terminal typing trainer with fill-in-the-blank passages")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "FILE", help = "Passage catalog (.toml or .json) to use instead of the bundled one")]
    passages: Option<PathBuf>,

    #[arg(short, long, value_name = "ID", help = "Passage to open first")]
    passage: Option<String>,

    #[arg(short, long, value_name = "MINUTES", help = "Start a countdown right away")]
    countdown: Option<String>,

    #[arg(long, help = "Show hidden characters")]
    hints: bool,
}

fn load_catalog(path: Option<PathBuf>) -> Result<PassageCatalog> {
    if let Some(path) = path {
        match PassageCatalog::from_file(&path) {
            Ok(catalog) => return Ok(catalog),
            Err(err) => warn!(%err, "falling back to bundled passages"),
        }
    }
    Ok(PassageCatalog::bundled()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load();
    let filter = loaded
        .as_ref()
        .map_or_else(|_| Config::default().log_filter, |c| c.log_filter.clone());
    let _log_guard = logging::init(&filter);
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut config = loaded.unwrap_or_else(|err| {
        warn!(%err, "ignoring unreadable config");
        Config::default()
    });

    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }
    if cli.hints {
        config.reveal_hidden = true;
    }
    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });

    let catalog = load_catalog(cli.passages.or_else(|| config.passage_path()))?;
    info!(passages = catalog.len(), source = catalog.source(), "catalog loaded");

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, catalog, theme, events.sender());

    if let Some(id) = cli.passage.as_deref() {
        app.select_passage_by_name(id);
    }
    if let Some(minutes) = cli.countdown.as_deref() {
        if !app.start_countdown(minutes) {
            warn!(minutes, "ignoring --countdown");
        }
    }
    app.sync_ticker();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Report event types so key releases can be told apart and dropped.
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = app.persist_settings() {
        warn!(%err, "could not save settings");
    }

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            app.frame_area = frame.area();
            render(frame, app);
        })?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::TimerTick(generation) => app.on_timer_tick(generation),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        app.sync_ticker();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only Press events are input; Release and Repeat would double-type.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Typing => handle_typing_key(app, key),
        AppScreen::PassagePicker => handle_picker_key(app, key),
        AppScreen::CountdownPrompt => app.handle_countdown_key(key),
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::F(1) => app.toggle_hints(),
        KeyCode::F(2) => app.open_picker(),
        KeyCode::F(3) => app.open_countdown_prompt(),
        KeyCode::F(4) => app.reset_timer(),
        KeyCode::F(5) => app.toggle_speed_tracking(),
        _ => {
            if let Some(edit) = edit_key_for(&key) {
                app.type_key(edit);
            }
        }
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::F(2) => app.screen = AppScreen::Typing,
        KeyCode::Up | KeyCode::Char('k') => app.picker_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.picker_next(),
        KeyCode::Enter => app.confirm_picker(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        app.click(mouse.column, mouse.row);
    }
}

fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    render_typing(frame, app);

    match app.screen {
        AppScreen::Typing => {}
        AppScreen::PassagePicker => {
            let catalog = app.session.catalog();
            let height = (catalog.len() as u16).saturating_add(3).max(6);
            let popup = centered_rect(60, height, area);
            let menu = PassageMenu::new(catalog, app.menu, app.session.active_id(), &app.theme);
            frame.render_widget(menu, popup);
        }
        AppScreen::CountdownPrompt => {
            let popup = centered_rect(44, 6, area);
            let prompt = CountdownPrompt::new(
                &app.countdown_input,
                app.countdown_error.as_deref(),
                &app.theme,
            );
            frame.render_widget(prompt, popup);
        }
    }
}

fn render_typing(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let session = &app.session;
    let app_layout = AppLayout::new(area);

    let title = session
        .active_passage()
        .map_or("(no passage)", |p| p.title.as_str());

    let header_style = Style::default().fg(colors.header_fg()).bg(colors.header_bg());
    let timer_label = match session.timer_state() {
        TimerState::Idle => "Idle",
        TimerState::Running { .. } => "Stopwatch",
        TimerState::CountingDown { .. } => "Countdown",
    };
    // Without a sidebar, accuracy moves up into the header.
    let accuracy = if app_layout.tier.show_sidebar() {
        String::new()
    } else {
        format!(" | Acc: {:.1}%", session.tally().accuracy())
    };
    let status = format!(
        " {timer_label} {} | WPM: {} | Hints: {} | Speed: {}{accuracy}",
        format_clock(session.elapsed_secs()),
        session.current_wpm(),
        if session.reveal_hidden() { "on" } else { "off" },
        if session.speed_tracking() { "on" } else { "off" },
    );

    let header_lines = vec![
        Line::from(Span::styled(
            format!(" cloze | {title}"),
            header_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(status, header_style)),
        Line::from(Span::styled(
            app.notice.as_deref().map(|n| format!(" {n}")).unwrap_or_default(),
            Style::default().fg(colors.warning()).bg(colors.header_bg()),
        )),
    ];
    let header = Paragraph::new(header_lines).style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    let cells = session.cells();
    let typing = TypingArea::new(
        title,
        &session.sheet().chars,
        &cells,
        session.cursor(),
        session.caret_at_end(),
        &app.theme,
    );
    frame.render_widget(typing, app_layout.main);

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = StatsSidebar::new(
            session.tally(),
            session.current_wpm(),
            session.speed_history(),
            &app.theme,
        );
        frame.render_widget(sidebar, sidebar_area);
    }

    let hints = [
        "[F1] hints",
        "[F2] passages",
        "[F3] countdown",
        "[F4] reset timer",
        "[F5] speed",
        "[Esc] quit",
    ];
    // Footer is one row; hints that do not fit are dropped.
    let footer_lines: Vec<Line> = pack_hint_lines(&hints, usize::from(app_layout.footer.width))
        .into_iter()
        .take(1)
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending()))))
        .collect();
    frame.render_widget(Paragraph::new(footer_lines), app_layout.footer);
}
