//! Core TUI application state and event loop.
//!
//! The session runs on a tokio runtime in the background; this loop stays
//! synchronous, polling crossterm for keys and redrawing from the latest
//! snapshot.

use std::io;
use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use lexi_core::{Session, SessionHandle, Snapshot};
use lexi_shared::{AppConfig, AssistantSettings, config_dir, resolve_config};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::screens::{ChatScreen, DocumentScreen};
use crate::widgets::{centered_rect, status_bar};

/// Application state.
pub(crate) struct App {
    session: SessionHandle,
    snapshots: watch::Receiver<Snapshot>,
    /// Latest snapshot received from the session.
    snapshot: Snapshot,
    settings: AssistantSettings,
    chat: ChatScreen,
    document: DocumentScreen,
    /// Whether the app should quit.
    should_quit: bool,
    /// Whether help overlay is visible.
    show_help: bool,
    /// Error shown in the status bar, if any.
    error: Option<String>,
}

impl App {
    pub(crate) fn new(session: SessionHandle, config: &AppConfig) -> Self {
        let snapshots = session.subscribe();
        let snapshot = snapshots.borrow().clone();
        Self {
            session,
            snapshots,
            snapshot,
            settings: AssistantSettings::from(config),
            chat: ChatScreen::new(),
            document: DocumentScreen::new(&config.documents.root),
            should_quit: false,
            show_help: false,
            error: None,
        }
    }

    /// Pull the newest snapshot, if the session published one.
    fn refresh(&mut self) {
        if self.snapshots.has_changed().unwrap_or(false) {
            self.snapshot = self.snapshots.borrow_and_update().clone();
            self.document.sync(self.snapshot.document.as_ref());
        }
    }

    fn status(&self) -> String {
        if let Some(err) = &self.error {
            return err.clone();
        }
        if self.snapshot.document.is_some() {
            return "Viewing citation - ↑/↓ scroll · Esc close".to_string();
        }
        if self.chat.is_busy(&self.snapshot) {
            return format!("{} is searching judgments...", self.settings.name);
        }
        format!(
            "Ready - {} message(s) · F1 help · Ctrl-C quit",
            self.snapshot.transcript.len()
        )
    }
}

/// Entry point - loads config, starts the session, runs the terminal UI.
pub(crate) fn run(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    init_tracing()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let (session, task) = {
        let _guard = runtime.enter();
        Session::from_config(&config)?
    };
    let app = App::new(session, &config);

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        // Lets terminals report Shift-Enter distinctly from Enter.
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, app);

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The app (and its session handle) is gone; let any in-flight answer land.
    runtime
        .block_on(task)
        .map_err(|e| eyre!("session task failed: {e}"))?;
    info!("tui exited");

    result
}

/// Log to `~/.lexi/lexi-tui.log`; stdout belongs to the terminal UI.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("lexi-tui.log"))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexi=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.refresh();
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::F(1) => {
            app.show_help = !app.show_help;
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // The document overlay is modal while open.
    let command = if app.snapshot.document.is_some() {
        app.document.handle_key(code)
    } else {
        app.chat.handle_key(code, modifiers, &app.snapshot)
    };

    if let Some(command) = command {
        if let Err(e) = app.session.send(command) {
            warn!(error = %e, "session rejected command");
            app.error = Some(e.to_string());
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Chat
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    app.chat.draw(
        f,
        chunks[0],
        &app.snapshot,
        &app.settings.name,
        &app.settings.greeting,
    );

    let status = app.status();
    f.render_widget(status_bar(&status), chunks[1]);

    if let Some(view) = &app.snapshot.document {
        app.document.draw(f, view);
    }

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  Enter            Send message"),
        Line::from("  Shift/Alt-Enter  New line"),
        Line::from("  Tab/S-Tab        Select citation"),
        Line::from("  Ctrl-O           Open selected citation"),
        Line::from("  PgUp/PgDn        Scroll transcript"),
        Line::from("  F1               Toggle this help"),
        Line::from("  Ctrl-C / Ctrl-Q  Quit"),
        Line::from(""),
        Line::from("Citation viewer:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ PgUp/PgDn    Scroll document"),
        Line::from("  Esc              Close"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}
