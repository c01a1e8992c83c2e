use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui_explorer::{FileExplorer, Theme};
use smart_transfer::notify;
use smart_transfer::{
    ConflictController, ConflictSession, Feedback, JobRequest, PluginCatalog, PluginDescriptor,
    Selection, Step, build_compress, build_decompress, settle,
};

use crate::action::{Action, AppCommand};

const BYTES_PER_MB: u64 = 1024 * 1024;
/// Volume size used when splitting is switched on without a configured size.
pub const DEFAULT_SPLIT_MB: u64 = 100;
const SPLIT_STEP_MB: u64 = 10;
/// ~3 seconds at the 250ms tick.
const STATUS_TICKS: u8 = 12;

/// UI mode the app is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// File explorer open for picking input files.
    AddFiles,
    /// File explorer open for picking the output directory.
    ChooseOutput,
    /// Decompression would overwrite files; waiting for y/n.
    Overwrite,
}

/// Transient notification shown in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub feedback: Feedback,
    /// Remaining ticks before the message expires.
    pub ticks_remaining: u8,
}

/// The TUI application state. This is a pure state machine:
/// inputs produce commands (side effects), actions update state.
pub struct App {
    pub catalog: PluginCatalog,
    pub selection: Selection,
    /// Cursor in the format list.
    pub format_cursor: usize,
    /// Volume size kept while splitting is off, so toggling restores it.
    pub split_mb: u64,

    pub mode: Mode,
    /// A dispatch is in flight.
    pub busy: bool,
    pub status_message: Option<StatusMessage>,
    pub file_explorer: Option<FileExplorer>,

    conflicts: ConflictController,
}

impl App {
    /// `startup` is shown first, typically a catalog load warning.
    pub fn new(catalog: PluginCatalog, mut selection: Selection, startup: Option<Feedback>) -> Self {
        // A configured format the backend does not offer starts unselected.
        let offered = selection.plugin.as_deref().is_none_or(|name| catalog.contains(name));
        if !offered {
            tracing::debug!(plugin = ?selection.plugin, "configured format not in catalog");
            selection.plugin = None;
        }
        let format_cursor = selection
            .plugin
            .as_deref()
            .and_then(|name| catalog.iter().position(|p| p.name == name))
            .unwrap_or(0);
        let split_mb = selection
            .options
            .split_bytes()
            .map(|bytes| (bytes / BYTES_PER_MB).max(1))
            .unwrap_or(DEFAULT_SPLIT_MB);

        let mut app = Self {
            catalog,
            selection,
            format_cursor,
            split_mb,
            mode: Mode::Normal,
            busy: false,
            status_message: None,
            file_explorer: None,
            conflicts: ConflictController::new(),
        };
        if let Some(feedback) = startup {
            app.notify(feedback);
        }
        app
    }

    /// Handle a terminal event, returning a command for the event loop.
    pub fn handle_event(&mut self, event: Event) -> AppCommand {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => AppCommand::None,
        }
    }

    /// Handle an async action (result from a background task).
    pub fn handle_action(&mut self, action: Action) -> AppCommand {
        match action {
            Action::Dispatched { request, outcome } => {
                self.busy = false;
                match settle(&mut self.conflicts, &request, outcome) {
                    Step::Notified(feedback) => self.notify(feedback),
                    Step::Prompt(_) => self.mode = Mode::Overwrite,
                    Step::Dismissed => {}
                }
                AppCommand::None
            }
        }
    }

    /// Tick the app forward (called on interval). Used for expiring status messages.
    pub fn tick(&mut self) {
        if let Some(msg) = &mut self.status_message {
            if msg.ticks_remaining == 0 {
                self.status_message = None;
            } else {
                msg.ticks_remaining -= 1;
            }
        }
    }

    /// The open overwrite prompt, if any.
    pub fn pending(&self) -> Option<&ConflictSession> {
        self.conflicts.session()
    }

    pub fn plugins(&self) -> Vec<&PluginDescriptor> {
        self.catalog.iter().collect()
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        // Ctrl+C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppCommand::Quit;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::AddFiles => self.handle_add_files_key(key),
            Mode::ChooseOutput => self.handle_choose_output_key(key),
            Mode::Overwrite => self.handle_overwrite_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Char('q') => AppCommand::Quit,
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_format_cursor(1);
                AppCommand::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_format_cursor(-1);
                AppCommand::None
            }
            KeyCode::Char('m') => {
                let mode = self.selection.options.mode.toggled();
                self.selection.set_mode(mode);
                AppCommand::None
            }
            KeyCode::Char('s') => {
                if self.selection.options.split_size.is_some() {
                    self.selection.disable_split();
                } else {
                    self.apply_split();
                }
                AppCommand::None
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.split_mb = self.split_mb.saturating_add(SPLIT_STEP_MB);
                self.refresh_split();
                AppCommand::None
            }
            KeyCode::Char('-') => {
                self.split_mb = self.split_mb.saturating_sub(SPLIT_STEP_MB).max(1);
                self.refresh_split();
                AppCommand::None
            }
            KeyCode::Char('x') => {
                self.selection.clear_files();
                AppCommand::None
            }
            KeyCode::Char('a') => {
                self.open_explorer(Mode::AddFiles);
                AppCommand::None
            }
            KeyCode::Char('o') => {
                self.open_explorer(Mode::ChooseOutput);
                AppCommand::None
            }
            KeyCode::Char('c') => self.start_compress(),
            KeyCode::Char('d') => self.start_decompress(),
            _ => AppCommand::None,
        }
    }

    fn handle_add_files_key(&mut self, key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Esc | KeyCode::Char('a') => self.close_explorer(),
            KeyCode::Enter => {
                if let Some(explorer) = &mut self.file_explorer {
                    let current = explorer.current();
                    if current.is_dir() {
                        let _ = explorer.handle(&Event::Key(key));
                    } else {
                        self.selection.toggle_file(current.path().clone());
                    }
                }
            }
            _ => self.forward_to_explorer(key),
        }
        AppCommand::None
    }

    fn handle_choose_output_key(&mut self, key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Esc => self.close_explorer(),
            KeyCode::Char('o') => {
                if let Some(explorer) = &self.file_explorer {
                    let dir = explorer.cwd().clone();
                    self.selection.set_output_dir(dir);
                }
                self.close_explorer();
            }
            _ => self.forward_to_explorer(key),
        }
        AppCommand::None
    }

    fn handle_overwrite_key(&mut self, key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                self.mode = Mode::Normal;
                match self.conflicts.confirm() {
                    Ok(request) => self.dispatch(request.into()),
                    Err(e) => {
                        self.notify(Feedback::error(e.to_string()));
                        AppCommand::None
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                // Closing the prompt is the only feedback.
                self.mode = Mode::Normal;
                if let Err(e) = self.conflicts.cancel() {
                    tracing::debug!(error = %e, "no overwrite prompt to cancel");
                }
                AppCommand::None
            }
            _ => AppCommand::None,
        }
    }

    fn start_compress(&mut self) -> AppCommand {
        if let Some(blocked) = self.blocked() {
            self.notify(blocked);
            return AppCommand::None;
        }
        match build_compress(&self.selection, &self.catalog) {
            Ok(request) => self.dispatch(request.into()),
            Err(e) => {
                self.notify(notify::build_error_feedback(&e));
                AppCommand::None
            }
        }
    }

    fn start_decompress(&mut self) -> AppCommand {
        if let Some(blocked) = self.blocked() {
            self.notify(blocked);
            return AppCommand::None;
        }
        match build_decompress(&self.selection) {
            Ok(request) => self.dispatch(request.into()),
            Err(e) => {
                self.notify(notify::build_error_feedback(&e));
                AppCommand::None
            }
        }
    }

    /// Why a new action cannot start right now.
    fn blocked(&self) -> Option<Feedback> {
        if self.conflicts.is_awaiting_decision() {
            Some(notify::pending_prompt_feedback())
        } else if self.busy {
            Some(Feedback::warning("A job is already running."))
        } else {
            None
        }
    }

    fn dispatch(&mut self, request: JobRequest) -> AppCommand {
        self.busy = true;
        AppCommand::Dispatch(request)
    }

    fn move_format_cursor(&mut self, delta: isize) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        // The first keypress only selects the format under the cursor.
        if self.selection.plugin.is_some() {
            self.format_cursor = self
                .format_cursor
                .saturating_add_signed(delta)
                .min(len - 1);
        }
        if let Some(plugin) = self.catalog.iter().nth(self.format_cursor) {
            self.selection.set_plugin(plugin.name.clone());
        }
    }

    fn apply_split(&mut self) {
        self.selection
            .set_split_size(self.split_mb.saturating_mul(BYTES_PER_MB));
    }

    /// Resizing only matters while splitting is on.
    fn refresh_split(&mut self) {
        if self.selection.options.split_size.is_some() {
            self.apply_split();
        }
    }

    fn open_explorer(&mut self, mode: Mode) {
        let theme = Theme::default().add_default_title();
        match FileExplorer::with_theme(theme) {
            Ok(mut explorer) => {
                let start = match mode {
                    Mode::ChooseOutput => self.selection.output_dir.clone(),
                    _ => self.last_file_dir(),
                };
                if let Some(dir) = start {
                    let _ = explorer.set_cwd(dir);
                }
                self.file_explorer = Some(explorer);
                self.mode = mode;
            }
            Err(e) => {
                self.notify(Feedback::error(format!("Failed to open file explorer: {e}")));
            }
        }
    }

    fn last_file_dir(&self) -> Option<PathBuf> {
        self.selection
            .files
            .last()
            .and_then(|f| f.parent())
            .map(|p| p.to_path_buf())
    }

    fn close_explorer(&mut self) {
        self.file_explorer = None;
        self.mode = Mode::Normal;
    }

    fn forward_to_explorer(&mut self, key: KeyEvent) {
        if let Some(explorer) = &mut self.file_explorer {
            let _ = explorer.handle(&Event::Key(key));
        }
    }

    fn notify(&mut self, feedback: Feedback) {
        self.status_message = Some(StatusMessage {
            feedback,
            ticks_remaining: STATUS_TICKS,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use smart_transfer::{CompressionMode, FailureKind, JobOutcome, PluginDescriptor};

    use super::*;

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl_key_event(c: char) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn catalog() -> PluginCatalog {
        PluginCatalog::from_plugins(vec![
            PluginDescriptor::new("zip", "1.0.0"),
            PluginDescriptor::new("7z", "1.0.0"),
            PluginDescriptor::new("gz", "1.0.0"),
        ])
    }

    fn ready_selection(file: &str) -> Selection {
        let mut selection = Selection::new();
        selection.set_files(vec![PathBuf::from(file)]);
        selection.set_output_dir("/out");
        selection
    }

    fn app_with(selection: Selection) -> App {
        App::new(catalog(), selection, None)
    }

    fn press(app: &mut App, code: KeyCode) -> AppCommand {
        app.handle_event(key_event(code))
    }

    fn status(app: &App) -> Option<&Feedback> {
        app.status_message.as_ref().map(|m| &m.feedback)
    }

    /// Run `d` on an archive and answer the dispatch with a conflict.
    fn open_prompt(app: &mut App) -> JobRequest {
        let AppCommand::Dispatch(request) = press(app, KeyCode::Char('d')) else {
            panic!("expected a dispatch");
        };
        app.handle_action(Action::Dispatched {
            request: request.clone(),
            outcome: JobOutcome::Conflict {
                existing_paths: vec![PathBuf::from("/out/a.txt")],
            },
        });
        request
    }

    // --- Construction ---

    #[test]
    fn startup_feedback_is_shown() {
        let app = App::new(
            PluginCatalog::empty(),
            Selection::new(),
            Some(Feedback::warning("Failed to load plugins: backend down")),
        );
        assert!(status(&app).is_some_and(Feedback::is_warning));
    }

    #[test]
    fn cursor_starts_on_configured_format() {
        let mut selection = Selection::new();
        selection.set_plugin("gz");
        let app = app_with(selection);
        assert_eq!(app.format_cursor, 2);
    }

    #[test]
    fn unknown_configured_format_is_cleared() {
        let mut selection = Selection::new();
        selection.set_plugin("rar");
        let mut app = app_with(selection);
        assert_eq!(app.selection.plugin, None);
        assert_eq!(app.format_cursor, 0);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selection.plugin.as_deref(), Some("zip"));
    }

    #[test]
    fn configured_split_size_is_kept() {
        let mut selection = Selection::new();
        selection.set_split_size(25 * BYTES_PER_MB);
        let app = app_with(selection);
        assert_eq!(app.split_mb, 25);
    }

    // --- Keys ---

    #[test]
    fn q_returns_quit() {
        let mut app = app_with(Selection::new());
        assert_eq!(press(&mut app, KeyCode::Char('q')), AppCommand::Quit);
    }

    #[test]
    fn ctrl_c_returns_quit() {
        let mut app = app_with(Selection::new());
        app.mode = Mode::Overwrite;
        assert_eq!(app.handle_event(ctrl_key_event('c')), AppCommand::Quit);
    }

    #[test]
    fn first_j_selects_then_moves() {
        let mut app = app_with(Selection::new());
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selection.plugin.as_deref(), Some("zip"));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selection.plugin.as_deref(), Some("7z"));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selection.plugin.as_deref(), Some("gz"));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selection.plugin.as_deref(), Some("7z"));
    }

    #[test]
    fn m_toggles_mode() {
        let mut app = app_with(Selection::new());
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.selection.options.mode, CompressionMode::Text);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.selection.options.mode, CompressionMode::Binary);
    }

    #[test]
    fn s_toggles_split_and_plus_minus_resize() {
        let mut app = app_with(Selection::new());
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(
            app.selection.options.split_bytes(),
            Some(DEFAULT_SPLIT_MB * BYTES_PER_MB)
        );

        press(&mut app, KeyCode::Char('+'));
        assert_eq!(
            app.selection.options.split_bytes(),
            Some((DEFAULT_SPLIT_MB + SPLIT_STEP_MB) * BYTES_PER_MB)
        );

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.selection.options.split_bytes(), None);
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.selection.options.split_bytes(), None);
        assert_eq!(app.split_mb, DEFAULT_SPLIT_MB);
    }

    #[test]
    fn minus_never_reaches_zero() {
        let mut app = app_with(Selection::new());
        app.split_mb = 5;
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.split_mb, 1);
    }

    #[test]
    fn x_clears_files() {
        let mut app = app_with(ready_selection("/x/a.txt"));
        press(&mut app, KeyCode::Char('x'));
        assert!(app.selection.files.is_empty());
    }

    // --- Compress ---

    #[test]
    fn compress_without_format_warns() {
        let mut app = app_with(ready_selection("/x/a.txt"));
        assert_eq!(press(&mut app, KeyCode::Char('c')), AppCommand::None);
        assert_eq!(
            status(&app),
            Some(&Feedback::warning("Choose a compression format first."))
        );
        assert!(!app.busy);
    }

    #[test]
    fn compress_dispatches_and_sets_busy() {
        let mut selection = ready_selection("/x/report.pdf");
        selection.set_plugin("zip");
        let mut app = app_with(selection);

        let AppCommand::Dispatch(JobRequest::Compress(request)) = press(&mut app, KeyCode::Char('c'))
        else {
            panic!("expected a compress dispatch");
        };
        assert_eq!(request.output_path(), Path::new("/out/report.zip"));
        assert!(app.busy);
    }

    #[test]
    fn busy_blocks_second_action() {
        let mut selection = ready_selection("/x/report.pdf");
        selection.set_plugin("zip");
        let mut app = app_with(selection);
        press(&mut app, KeyCode::Char('c'));

        assert_eq!(press(&mut app, KeyCode::Char('c')), AppCommand::None);
        assert_eq!(
            status(&app),
            Some(&Feedback::warning("A job is already running."))
        );
    }

    #[test]
    fn finished_dispatch_clears_busy_and_notifies() {
        let mut selection = ready_selection("/x/report.pdf");
        selection.set_plugin("zip");
        let mut app = app_with(selection);
        let AppCommand::Dispatch(request) = press(&mut app, KeyCode::Char('c')) else {
            panic!("expected a dispatch");
        };

        app.handle_action(Action::Dispatched {
            request,
            outcome: JobOutcome::failure(FailureKind::Backend, "disk full"),
        });
        assert!(!app.busy);
        assert_eq!(
            status(&app),
            Some(&Feedback::error("Compression failed: disk full"))
        );
    }

    // --- Decompress and overwrite prompt ---

    #[test]
    fn decompress_rejects_non_archive() {
        let mut app = app_with(ready_selection("/x/notes.txt"));
        assert_eq!(press(&mut app, KeyCode::Char('d')), AppCommand::None);
        assert!(status(&app).is_some_and(Feedback::is_error));
    }

    #[test]
    fn conflict_opens_overwrite_prompt() {
        let mut app = app_with(ready_selection("/x/archive.zip"));
        open_prompt(&mut app);

        assert_eq!(app.mode, Mode::Overwrite);
        assert!(!app.busy);
        assert_eq!(
            app.pending().map(|s| s.existing_paths().to_vec()),
            Some(vec![PathBuf::from("/out/a.txt")])
        );
    }

    #[test]
    fn y_redispatches_with_overwrite() {
        let mut app = app_with(ready_selection("/x/archive.zip"));
        open_prompt(&mut app);

        let AppCommand::Dispatch(JobRequest::Decompress(request)) =
            press(&mut app, KeyCode::Char('y'))
        else {
            panic!("expected a decompress dispatch");
        };
        assert!(request.overwrite());
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.busy);

        app.handle_action(Action::Dispatched {
            request: request.into(),
            outcome: JobOutcome::Success,
        });
        assert_eq!(
            status(&app),
            Some(&Feedback::success("Files decompressed successfully"))
        );
        assert!(app.pending().is_none());
    }

    #[test]
    fn esc_cancels_prompt_without_dispatch() {
        let mut app = app_with(ready_selection("/x/archive.zip"));
        open_prompt(&mut app);

        assert!(app.status_message.is_none());

        assert_eq!(press(&mut app, KeyCode::Esc), AppCommand::None);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.pending().is_none());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn n_cancels_prompt_silently() {
        let mut app = app_with(ready_selection("/x/archive.zip"));
        open_prompt(&mut app);

        assert_eq!(press(&mut app, KeyCode::Char('n')), AppCommand::None);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.pending().is_none());
        assert!(app.status_message.is_none());
        assert!(!app.busy);
    }

    #[test]
    fn other_keys_leave_prompt_open() {
        let mut app = app_with(ready_selection("/x/archive.zip"));
        open_prompt(&mut app);

        assert_eq!(press(&mut app, KeyCode::Char('c')), AppCommand::None);
        assert_eq!(app.mode, Mode::Overwrite);
        assert!(app.pending().is_some());
    }

    // --- Status ---

    #[test]
    fn tick_expires_status_message() {
        let mut app = app_with(Selection::new());
        app.status_message = Some(StatusMessage {
            feedback: Feedback::success("hello"),
            ticks_remaining: 1,
        });

        app.tick(); // ticks_remaining -> 0
        assert!(app.status_message.is_some());

        app.tick(); // expires
        assert!(app.status_message.is_none());
    }
}
