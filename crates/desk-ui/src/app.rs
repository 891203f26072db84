//! Main application state and TUI event loop for the desk dashboard.
//!
//! [`App`] owns the theme, view mode, chart filter, chat state and the
//! snapshot cache. Completion calls run on spawned tasks and report back
//! over an mpsc channel so the 250 ms draw loop never blocks on the network.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::Text,
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::debug;

use desk_data::aggregator;
use desk_data::analysis::DashboardSnapshot;
use desk_data::cache::SnapshotCache;
use desk_insight::client::CompletionClient;
use desk_insight::prompt::{
    build_chat_system_prompt, build_insight_prompt, ANALYST_SYSTEM_PROMPT, CHAT_TEMPERATURE,
    INSIGHT_TEMPERATURE,
};
use desk_insight::session::ChatSession;

use crate::chart_view::{self, ChartViewData};
use crate::header::Header;
use crate::insight_view::{self, InsightViewData};
use crate::roster_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Per-operator roster table.
    Roster,
    /// Unit filter plus grouped activity bars.
    Chart,
    /// Generated insight and chat.
    Insight,
}

// ── CompletionOutcome ─────────────────────────────────────────────────────────

/// Outcome of a spawned completion round trip, delivered over the channel.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// Result of an insight generation request.
    Insight(desk_core::error::Result<String>),
    /// Result of a chat question, carrying the question for the history.
    Chat {
        question: String,
        result: desk_core::error::Result<String>,
    },
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the desk activity TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Memoizing pipeline wrapper behind the `r` key.
    cache: SnapshotCache,
    /// Last good snapshot; a failed refresh keeps the previous one.
    snapshot: DashboardSnapshot,
    /// Units currently ticked in the chart filter.
    selected_units: Vec<String>,
    /// Cursor row in the chart filter panel.
    filter_cursor: usize,
    /// Client for insight and chat calls.
    client: CompletionClient,
    /// Latest generated insight, if any.
    insight: Option<String>,
    /// Conversation history for the insight view.
    chat: ChatSession,
    /// Text in the insight view input line.
    input: String,
    /// True while a completion call is in flight.
    busy: bool,
    /// Error text from the last failed completion call.
    completion_error: Option<String>,
    /// Transient header status (refresh results).
    status: Option<String>,
}

impl App {
    /// Construct the application around an initial snapshot.
    ///
    /// Every unit starts selected, matching the source dashboard's filter
    /// default.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        cache: SnapshotCache,
        snapshot: DashboardSnapshot,
        client: CompletionClient,
    ) -> Self {
        let selected_units = snapshot.units.clone();
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            should_quit: false,
            cache,
            snapshot,
            selected_units,
            filter_cursor: 0,
            client,
            insight: None,
            chat: ChatSession::new(),
            input: String::new(),
            busy: false,
            completion_error: None,
            status: None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the dashboard TUI until the user quits.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// the terminal event loop stays on the current thread while completion
    /// outcomes arrive on the async channel via `try_recv`.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (tx, mut rx) = mpsc::channel::<CompletionOutcome>(8);
        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key, &tx);
                }
            }

            // Drain completion outcomes delivered by spawned tasks.
            while let Ok(outcome) = rx.try_recv() {
                self.apply_outcome(outcome);
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<CompletionOutcome>) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.view_mode {
            ViewMode::Insight => self.handle_insight_key(key, tx),
            _ => self.handle_browse_key(key, tx),
        }
    }

    /// Keys for the roster and chart views, where no text input is focused.
    fn handle_browse_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<CompletionOutcome>) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.view_mode = ViewMode::Roster,
            KeyCode::Char('2') => self.view_mode = ViewMode::Chart,
            KeyCode::Char('3') => self.view_mode = ViewMode::Insight,
            KeyCode::Tab => self.cycle_view(),
            KeyCode::Char('r') => self.refresh_data(),
            KeyCode::Char('i') => {
                self.view_mode = ViewMode::Insight;
                self.request_insight(tx);
            }
            KeyCode::Up if self.view_mode == ViewMode::Chart => {
                self.filter_cursor = self.filter_cursor.saturating_sub(1);
            }
            KeyCode::Down if self.view_mode == ViewMode::Chart => {
                if self.filter_cursor + 1 < self.snapshot.units.len() {
                    self.filter_cursor += 1;
                }
            }
            KeyCode::Char(' ') if self.view_mode == ViewMode::Chart => self.toggle_unit(),
            KeyCode::Char('a') if self.view_mode == ViewMode::Chart => {
                self.selected_units = self.snapshot.units.clone();
            }
            KeyCode::Char('n') if self.view_mode == ViewMode::Chart => {
                self.selected_units.clear();
            }
            _ => {}
        }
    }

    /// Keys for the insight view. Printable characters feed the input line,
    /// so quitting happens via Esc on an empty line, Tab, or Ctrl+C.
    fn handle_insight_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<CompletionOutcome>) {
        match key.code {
            KeyCode::Tab => self.cycle_view(),
            KeyCode::Esc => {
                if self.input.is_empty() {
                    self.should_quit = true;
                } else {
                    self.input.clear();
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => self.submit_input(tx),
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn cycle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Roster => ViewMode::Chart,
            ViewMode::Chart => ViewMode::Insight,
            ViewMode::Insight => ViewMode::Roster,
        };
    }

    // ── Data refresh ──────────────────────────────────────────────────────────

    /// Recompute the snapshot through the cache, keeping the previous one on
    /// failure.
    fn refresh_data(&mut self) {
        match self.cache.refresh() {
            Ok(snapshot) => {
                self.snapshot = snapshot.clone();
                self.reconcile_filter();
                self.status = Some(format!(
                    "Data refreshed: {} records",
                    self.snapshot.metadata.records_normalized
                ));
                debug!(
                    records = self.snapshot.metadata.records_normalized,
                    "snapshot refreshed"
                );
            }
            Err(e) => {
                self.status = Some(format!("Refresh failed: {}", e));
            }
        }
    }

    /// Drop selected units the new snapshot no longer carries and clamp the
    /// cursor.
    fn reconcile_filter(&mut self) {
        let units = &self.snapshot.units;
        self.selected_units.retain(|u| units.contains(u));
        if self.filter_cursor >= self.snapshot.units.len() {
            self.filter_cursor = self.snapshot.units.len().saturating_sub(1);
        }
    }

    fn toggle_unit(&mut self) {
        if let Some(unit) = self.snapshot.units.get(self.filter_cursor) {
            if let Some(pos) = self.selected_units.iter().position(|u| u == unit) {
                self.selected_units.remove(pos);
            } else {
                self.selected_units.push(unit.clone());
            }
        }
    }

    // ── Completion calls ──────────────────────────────────────────────────────

    /// Empty input regenerates the insight; anything else goes out as a chat
    /// question.
    fn submit_input(&mut self, tx: &mpsc::Sender<CompletionOutcome>) {
        if self.busy {
            return;
        }
        if self.input.is_empty() {
            self.request_insight(tx);
        } else {
            let question = std::mem::take(&mut self.input);
            self.request_chat(question, tx);
        }
    }

    fn request_insight(&mut self, tx: &mpsc::Sender<CompletionOutcome>) {
        if self.busy {
            return;
        }
        self.busy = true;
        self.completion_error = None;

        let roster = aggregator::filter_roster(&self.snapshot.roster, &self.selected_units);
        let prompt = build_insight_prompt(&roster, &self.snapshot.totals);
        let client = self.client.clone();
        let tx = tx.clone();
        debug!(operators = roster.len(), "requesting insight");
        tokio::spawn(async move {
            let result = client
                .complete(ANALYST_SYSTEM_PROMPT, &prompt, INSIGHT_TEMPERATURE)
                .await;
            let _ = tx.send(CompletionOutcome::Insight(result)).await;
        });
    }

    fn request_chat(&mut self, question: String, tx: &mpsc::Sender<CompletionOutcome>) {
        self.busy = true;
        self.completion_error = None;

        let roster = aggregator::filter_roster(&self.snapshot.roster, &self.selected_units);
        let system_prompt = build_chat_system_prompt(&roster, &self.selected_units);
        let client = self.client.clone();
        let tx = tx.clone();
        debug!(operators = roster.len(), "sending chat question");
        tokio::spawn(async move {
            let result = client
                .complete(&system_prompt, &question, CHAT_TEMPERATURE)
                .await;
            let _ = tx.send(CompletionOutcome::Chat { question, result }).await;
        });
    }

    /// Fold a finished completion call back into the state.
    ///
    /// A failed chat question returns to the input line so it can be edited
    /// and resent.
    fn apply_outcome(&mut self, outcome: CompletionOutcome) {
        self.busy = false;
        match outcome {
            CompletionOutcome::Insight(Ok(text)) => {
                self.insight = Some(text);
            }
            CompletionOutcome::Insight(Err(e)) => {
                self.completion_error = Some(format!("Insight request failed: {}", e));
            }
            CompletionOutcome::Chat {
                question,
                result: Ok(answer),
            } => {
                self.chat.record(question, answer);
            }
            CompletionOutcome::Chat {
                question,
                result: Err(e),
            } => {
                self.completion_error = Some(format!("Chat request failed: {}", e));
                self.input = question;
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the header and the active view into `frame`.
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(frame.area());

        let header = Header::new(
            &self.snapshot.totals,
            &self.view_mode,
            self.status.as_deref(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);

        match self.view_mode {
            ViewMode::Roster => {
                roster_view::render_roster_view(
                    frame,
                    chunks[1],
                    &self.snapshot.roster,
                    &self.snapshot.totals,
                    &self.theme,
                );
            }
            ViewMode::Chart => {
                let data = self.chart_data();
                chart_view::render_chart_view(frame, chunks[1], &data, &self.theme);
            }
            ViewMode::Insight => {
                let data = self.insight_data();
                insight_view::render_insight_view(frame, chunks[1], &data, &self.theme);
            }
        }
    }

    fn chart_data(&self) -> ChartViewData {
        ChartViewData {
            units: self.snapshot.units.clone(),
            selected: self.selected_units.clone(),
            cursor: self.filter_cursor,
            entries: aggregator::filter_pivot(&self.snapshot.pivot, &self.selected_units),
        }
    }

    fn insight_data(&self) -> InsightViewData {
        InsightViewData {
            insight: self.insight.clone(),
            turns: self.chat.turns.clone(),
            input: self.input.clone(),
            status: self.completion_error.clone(),
            busy: self.busy,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
