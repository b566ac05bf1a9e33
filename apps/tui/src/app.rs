//! Core TUI application state and event loop.

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use meetingprep_core::Generation;
use meetingprep_core::pipeline::{PrepareResult, ProgressReporter};
use meetingprep_shared::{AppConfig, DerivedField, load_config};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use crate::screens::{
    BriefScreen, CredentialsScreen, MeetingFormScreen, ScreenAction, ScreenId,
};
use crate::widgets::{RunView, draw_run_view, status_bar};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    pub form: MeetingFormScreen,
    pub brief: BriefScreen,
    pub credentials: CredentialsScreen,
    pub config: AppConfig,
}

impl App {
    pub(crate) fn new(config: AppConfig, status: String) -> Self {
        Self {
            active_tab: 0,
            should_quit: false,
            status,
            show_help: false,
            form: MeetingFormScreen::new(config.defaults.duration_minutes),
            brief: BriefScreen::new(),
            credentials: CredentialsScreen::new(&config),
            config,
        }
    }

    fn current(&self) -> ScreenId {
        ScreenId::ALL[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        match self.current() {
            ScreenId::Meeting => self.form.is_editing(),
            ScreenId::Brief => false,
            ScreenId::Credentials => self.credentials.is_editing(),
        }
    }

    fn select_tab(&mut self, idx: usize) {
        self.active_tab = idx;
        self.status = format!("{}", self.current());
    }
}

/// Entry point — sets up terminal, runs event loop, restores terminal.
pub(crate) fn run() -> Result<()> {
    let (config, status) = match load_config() {
        Ok(config) => (config, "Ready — press ? for help".to_string()),
        Err(e) => {
            warn!(error = %e, "falling back to default config");
            (AppConfig::default(), format!("Using default config: {e}"))
        }
    };

    // One-shot runs are awaited on this thread; nothing runs in parallel.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let mut app = App::new(config, status);
    let result = run_app(&mut terminal, &mut app, &runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Term, app: &mut App, runtime: &Runtime) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key(app, key.code, key.modifiers) {
                        match action {
                            ScreenAction::Prepare => prepare(app, terminal, runtime)?,
                            ScreenAction::Status(msg) => app.status = msg,
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<ScreenAction> {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return None;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return None;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='3') if !app.is_editing() => {
            app.select_tab((c as usize) - ('1' as usize));
            return None;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.select_tab((app.active_tab + 1) % ScreenId::ALL.len());
            return None;
        }
        KeyCode::BackTab if !app.is_editing() => {
            let len = ScreenId::ALL.len();
            app.select_tab((app.active_tab + len - 1) % len);
            return None;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return None;
    }

    // Delegate to current screen
    match app.current() {
        ScreenId::Meeting => app.form.handle_key(code, modifiers),
        ScreenId::Brief => app.brief.handle_key(code, modifiers),
        ScreenId::Credentials => app.credentials.handle_key(code, modifiers),
    }
}

// ---------------------------------------------------------------------------
// Pipeline run
// ---------------------------------------------------------------------------

/// Run one preparation, blocking the event loop until it finishes.
fn prepare(app: &mut App, terminal: &mut Term, runtime: &Runtime) -> Result<()> {
    let inputs = app.form.inputs();
    let overrides = app.credentials.overrides();
    let company = inputs.company_name.clone();

    info!(company = %company, duration = inputs.meeting_duration, "prepare requested");

    let progress = TuiProgress::new(terminal, &company);
    progress.redraw();
    let outcome = runtime.block_on(meetingprep_core::prepare_meeting(
        &app.config,
        &overrides,
        inputs,
        &progress,
    ));
    drop(progress);

    // Keys pressed during the run are stale.
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }

    match outcome {
        Ok(result) => {
            let msg = format!(
                "Brief ready in {:.1}s ({} sources, {} tokens out)",
                result.elapsed.as_secs_f64(),
                result.state.search_result_count(),
                result.total_tokens_out,
            );
            app.brief
                .show(&company, result.state.session_id().clone(), result.brief());
            app.form.set_status(msg.clone());
            app.select_tab(1);
            app.status = msg;
        }
        Err(e) => {
            error!(error = %e, "preparation failed");
            let msg = format!("Error: {e}");
            app.form.set_status(msg.clone());
            app.status = msg;
        }
    }
    terminal.clear()?;
    Ok(())
}

/// Redraws the run checklist as the pipeline reports progress.
struct TuiProgress<'t> {
    terminal: Mutex<&'t mut Term>,
    view: Mutex<RunView>,
}

impl<'t> TuiProgress<'t> {
    fn new(terminal: &'t mut Term, company: &str) -> Self {
        Self {
            terminal: Mutex::new(terminal),
            view: Mutex::new(RunView {
                company: company.to_string(),
                phase: "Resolving API keys".to_string(),
                ..RunView::default()
            }),
        }
    }

    fn update(&self, f: impl FnOnce(&mut RunView)) {
        if let Ok(mut view) = self.view.lock() {
            f(&mut view);
        }
        self.redraw();
    }

    fn redraw(&self) {
        let (Ok(mut terminal), Ok(view)) = (self.terminal.lock(), self.view.lock()) else {
            return;
        };
        if let Err(e) = terminal.draw(|f| draw_run_view(f, &view)) {
            warn!(error = %e, "failed to draw run view");
        }
    }
}

impl ProgressReporter for TuiProgress<'_> {
    fn phase(&self, name: &str) {
        self.update(|v| v.phase = format!("{name}..."));
    }

    fn step_started(&self, field: DerivedField, current: usize, total: usize) {
        self.update(|v| {
            v.current = Some(field);
            v.phase = format!("Step {current} of {total}");
        });
    }

    fn step_finished(&self, field: DerivedField, generation: &Generation) {
        self.update(|v| {
            v.completed.push(field);
            v.current = None;
            v.phase = format!(
                "{} tokens in {:.1}s",
                generation.tokens_out,
                generation.latency_ms as f64 / 1000.0
            );
        });
    }

    fn done(&self, _result: &PrepareResult) {
        self.update(|v| v.phase = "Done".to_string());
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = ScreenId::ALL
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" MeetingPrep "))
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area — delegate to screen
    match app.current() {
        ScreenId::Meeting => app.form.draw(f, chunks[1]),
        ScreenId::Brief => app.brief.draw(f, chunks[1]),
        ScreenId::Credentials => app.credentials.draw(f, chunks[1]),
    }

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from("How to use").style(bold),
        Line::from(""),
        Line::from("  1. Enter the company, objective and attendees"),
        Line::from("  2. Pick a duration and any focus areas"),
        Line::from("  3. Add API keys on the API Keys tab if not in the environment"),
        Line::from("  4. Press p to research and draft the executive brief"),
        Line::from(""),
        Line::from("Keybindings").style(bold),
        Line::from(""),
        Line::from("  1-3          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Screen-specific:").style(bold),
        Line::from("  Enter        Edit field"),
        Line::from("  Esc          Stop editing"),
        Line::from("  ↑/↓          Move between fields / scroll brief"),
        Line::from("  ←/→          Change duration"),
        Line::from("  p / F5       Prepare meeting"),
        Line::from("  s            Save brief to file"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
