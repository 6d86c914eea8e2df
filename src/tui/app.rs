use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;
use tracing::{debug, info};

use crate::io::{HttpTransport, RemoteClient};
use crate::model::{ClientConfig, Project, Scope};
use crate::ops::reconcile::{Outcome, ReconcileError, Session, SessionOptions};
use crate::util::unicode;

use super::input;
use super::render;
use super::theme::Theme;

/// Which screen is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The project picker ("Today" plus every project)
    Projects,
    /// The open tasks of the session's scope
    Tasks,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing the content of a new task
    Prompt,
    /// Waiting for y/n on a delete
    Confirm,
    Search,
}

/// A command that needs the network. Queued by input handling and run on the
/// next loop turn, after "working…" has been drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    OpenScope(usize),
    ReloadProjects,
    Complete(usize),
    Reopen(usize),
    Create(String),
    Delete(String),
    Reload,
}

/// Target of a pending delete confirmation. Holds the id, not the row, so the
/// task deleted is the one that was shown when `d` was pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmState {
    pub task_id: String,
    pub content: String,
}

/// Single-line text input with a grapheme-aware cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    pub text: String,
    /// Byte offset, always on a grapheme boundary
    pub cursor: usize,
}

impl LineInput {
    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(start) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    pub fn delete(&mut self) {
        if let Some(end) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..end, "");
        }
    }

    pub fn delete_word(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Take the text out, leaving the input empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

/// Main application state
pub struct App {
    pub client: RemoteClient,
    pub options: SessionOptions,
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Used to flag overdue tasks
    pub today: NaiveDate,
    /// Picker rows: Today, then the projects in server order
    pub scopes: Vec<Scope>,
    pub projects_cursor: usize,
    pub projects_scroll: usize,
    /// The open task list, present only in the Tasks view
    pub session: Option<Session>,
    pub tasks_cursor: usize,
    pub tasks_scroll: usize,
    pub prompt: LineInput,
    pub confirm_state: Option<ConfirmState>,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub show_help: bool,
    /// Search mode: current query being typed
    pub search_input: String,
    /// Last executed search pattern
    pub last_search: Option<String>,
    pub pending: Option<PendingAction>,
}

impl App {
    pub fn new(client: RemoteClient, options: SessionOptions, projects: &[Project]) -> Self {
        App {
            client,
            options,
            view: View::Projects,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::default(),
            today: chrono::Local::now().date_naive(),
            scopes: Scope::picker_entries(projects),
            projects_cursor: 0,
            projects_scroll: 0,
            session: None,
            tasks_cursor: 0,
            tasks_scroll: 0,
            prompt: LineInput::default(),
            confirm_state: None,
            status_message: None,
            status_is_error: false,
            show_help: false,
            search_input: String::new(),
            last_search: None,
            pending: None,
        }
    }

    /// Get the active search regex for highlighting.
    /// In Search mode: compiles from current input. In Navigate: compiles from last_search.
    pub fn active_search_re(&self) -> Option<Regex> {
        let pattern = match self.mode {
            Mode::Search if !self.search_input.is_empty() => &self.search_input,
            Mode::Navigate => self.last_search.as_deref()?,
            _ => return None,
        };
        Regex::new(&format!("(?i){}", pattern))
            .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
            .ok()
    }

    /// Labels of the rows in the current view, in display order
    pub fn row_labels(&self) -> Vec<&str> {
        match self.view {
            View::Projects => self.scopes.iter().map(Scope::title).collect(),
            View::Tasks => self
                .session
                .iter()
                .flat_map(|s| s.menu().entries())
                .map(|entry| entry.label())
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self.view {
            View::Projects => self.scopes.len(),
            View::Tasks => self.session.as_ref().map_or(0, |s| s.menu().len()),
        }
    }

    pub fn cursor(&self) -> usize {
        match self.view {
            View::Projects => self.projects_cursor,
            View::Tasks => self.tasks_cursor,
        }
    }

    /// Move the current view's cursor, clamped to its rows
    pub fn set_cursor(&mut self, position: usize) {
        let last = self.row_count().saturating_sub(1);
        let position = position.min(last);
        match self.view {
            View::Projects => self.projects_cursor = position,
            View::Tasks => self.tasks_cursor = position,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_is_error = false;
    }

    /// Queue a network command and show that it is in flight
    pub fn queue(&mut self, action: PendingAction) {
        debug!(?action, "queued");
        self.pending = Some(action);
        self.set_status("working\u{2026}");
    }

    /// Run the queued command, if any, and report its outcome.
    pub fn flush_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };
        match action {
            PendingAction::OpenScope(index) => self.open_scope(index),
            PendingAction::ReloadProjects => self.reload_projects(),
            PendingAction::Complete(position) => {
                let result = self.with_session(|s, client| s.complete(client, position));
                self.report(result);
            }
            PendingAction::Reopen(position) => {
                let result = self.with_session(|s, client| s.reopen(client, position));
                self.report(result);
            }
            PendingAction::Create(content) => {
                let result = self.with_session(|s, client| s.create(client, &content));
                let created = matches!(result, Ok(Outcome::Applied { .. }));
                self.report(result);
                if created {
                    let last = self.row_count().saturating_sub(1);
                    self.set_cursor(last);
                }
            }
            PendingAction::Delete(task_id) => {
                let result = self.with_session(|s, client| s.delete(client, &task_id));
                self.report(result);
            }
            PendingAction::Reload => {
                let result = self.with_session(|s, client| s.reload(client));
                self.report(result);
            }
        }
    }

    fn with_session(
        &mut self,
        f: impl FnOnce(&mut Session, &RemoteClient) -> Result<Outcome, ReconcileError>,
    ) -> Result<Outcome, ReconcileError> {
        match self.session.as_mut() {
            Some(session) => f(session, &self.client),
            None => Ok(Outcome::NoSelection),
        }
    }

    /// Show an engine outcome in the status row and keep the cursor on a row.
    pub fn report(&mut self, result: Result<Outcome, ReconcileError>) {
        match result {
            Ok(Outcome::Applied { summary }) => self.set_status(summary),
            Ok(Outcome::NoSelection) => self.clear_status(),
            Ok(Outcome::EmptyInput) => self.set_status("nothing added"),
            Err(e) => self.set_error(e.to_string()),
        }
        let cursor = self.cursor();
        self.set_cursor(cursor);
    }

    fn open_scope(&mut self, index: usize) {
        let Some(scope) = self.scopes.get(index).cloned() else {
            return;
        };
        match Session::open(&self.client, scope, self.options) {
            Ok(session) => {
                info!(scope = session.scope().title(), "viewing tasks");
                self.session = Some(session);
                self.view = View::Tasks;
                self.tasks_cursor = 0;
                self.tasks_scroll = 0;
                self.clear_status();
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn reload_projects(&mut self) {
        let loaded = self
            .client
            .get_projects()
            .map_err(ReconcileError::from)
            .and_then(|raw| Ok(Project::load_list(&raw)?));
        match loaded {
            Ok(projects) => {
                self.scopes = Scope::picker_entries(&projects);
                self.set_status(format!("{} projects", projects.len()));
                let cursor = self.projects_cursor;
                self.set_cursor(cursor);
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Leave the task list; its collection is dropped.
    pub fn close_session(&mut self) {
        self.session = None;
        self.view = View::Projects;
        self.tasks_cursor = 0;
        self.tasks_scroll = 0;
        self.last_search = None;
    }
}

/// Run the TUI application
pub fn run(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = RemoteClient::new(Box::new(HttpTransport::new(config)));
    let projects = Project::load_list(&client.get_projects()?)?;
    info!(projects = projects.len(), "starting tui");

    let mut app = App::new(client, SessionOptions::from(config), &projects);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // The frame just drawn shows "working…"; now block on the call
        if app.pending.is_some() {
            app.flush_pending();
            continue;
        }

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
