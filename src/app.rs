use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::event::Event;
use crate::fs::discovery::{DiscoveryError, PathEntry};
use crate::fs::watcher::{self, FsWatcher};
use crate::theme::{self, ThemeColors};
use crate::tree::{ClickOutcome, DiscoveryRequest, NodeId, TreeState};

/// Application mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Typing a directory to open.
    PathPrompt,
    Help,
}

/// Title bar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Minimize,
    ToggleMaximize,
    Close,
}

/// State for the path prompt's text input.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    pub cursor_position: usize,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Screen areas from the last draw, used for mouse hit testing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutAreas {
    pub title_bar: Rect,
    /// Inner area of the tree panel (one row per node).
    pub tree: Rect,
}

const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub config: AppConfig,
    pub theme: ThemeColors,
    pub tree: TreeState,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub status_message: Option<StatusMessage>,
    pub should_quit: bool,
    /// Title and status bars hidden.
    pub maximized: bool,
    /// Only the title bar is drawn until the next key or click.
    pub minimized: bool,
    pub layout: LayoutAreas,
    pub fs_changes: usize,
    watcher: Option<FsWatcher>,
    event_tx: mpsc::UnboundedSender<Event>,
    pending: Vec<DiscoveryRequest>,
}

impl App {
    pub fn new(config: AppConfig, event_tx: mpsc::UnboundedSender<Event>) -> Self {
        let theme = theme::resolve_theme(&config.theme);
        let tree = TreeState::new(config.tree_settings());
        let maximized = config.start_maximized();
        tracing::debug!(scheme = config.theme_scheme(), "theme resolved");
        Self {
            config,
            theme,
            tree,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            status_message: None,
            should_quit: false,
            maximized,
            minimized: false,
            layout: LayoutAreas::default(),
            fs_changes: 0,
            watcher: None,
            event_tx,
            pending: Vec::new(),
        }
    }

    /// Replace the tree with `path` and start watching it.
    ///
    /// An empty path is a no-op. A root that is missing or not a directory is
    /// opened anyway and its discovery error becomes the root's only child.
    /// A watcher failure is returned after the tree has been opened.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }

        if let Some(old) = self.watcher.take() {
            old.cancel();
        }
        if let Some(request) = self.tree.open_path(path) {
            self.pending.push(request);
        }

        if !path.is_dir() {
            tracing::debug!(path = %path.display(), "not a directory, watcher skipped");
        } else if self.config.watcher_enabled() {
            let ignore = watcher::DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect();
            let watcher = FsWatcher::new(
                path,
                Duration::from_millis(self.config.debounce_ms()),
                ignore,
                watcher::DEFAULT_FLOOD_THRESHOLD,
                self.event_tx.clone(),
            )?;
            self.watcher = Some(watcher);
        }
        Ok(())
    }

    /// Open `path`, reporting a watcher failure in the status bar.
    pub fn open_path_reporting(&mut self, path: &Path) {
        match self.open_path(path) {
            Ok(()) => self.set_status_message(format!("Opened {}", path.display())),
            Err(err) => {
                tracing::warn!(%err, "watcher unavailable");
                self.set_status_error(format!("Watcher unavailable: {err}"));
            }
        }
    }

    /// Open the parent of the current root.
    pub fn open_parent(&mut self) {
        let parent = self
            .root_path()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf);
        if let Some(parent) = parent {
            self.open_path_reporting(&parent);
        }
    }

    pub fn root_path(&self) -> Option<&Path> {
        let path = self.tree.root_node().path();
        (!path.as_os_str().is_empty()).then_some(path)
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Discovery requests issued since the last call.
    pub fn take_pending_discoveries(&mut self) -> Vec<DiscoveryRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn handle_discovered(
        &mut self,
        node: NodeId,
        result: std::result::Result<Vec<PathEntry>, DiscoveryError>,
    ) {
        if !self.tree.finish_discovery(node, result) {
            tracing::debug!("stale discovery result ignored");
        }
    }

    pub fn handle_fs_change(&mut self, paths: Vec<PathBuf>) {
        self.fs_changes += 1;
        for path in &paths {
            tracing::debug!(path = %path.display(), "change under root");
        }
    }

    fn apply_click(&mut self, outcome: ClickOutcome) {
        if let ClickOutcome::Loading(request) = outcome {
            self.pending.push(request);
        }
    }

    /// Click the row at `index` in the render window.
    pub fn click_row(&mut self, index: usize) {
        let outcome = self.tree.click(index);
        self.apply_click(outcome);
    }

    /// Toggle the focused node.
    pub fn activate_focused(&mut self) {
        if let Some(id) = self.tree.focused() {
            let outcome = self.tree.click_node(id);
            self.apply_click(outcome);
        }
    }

    /// Expand the focused directory, or step into it when already expanded.
    pub fn expand_focused(&mut self) {
        let Some(node) = self.tree.focused().and_then(|id| self.tree.node(id)) else {
            self.tree.focus_first();
            return;
        };
        let (is_dir, expanded, loading) = (node.is_dir(), node.expanded, node.loading);
        match (is_dir, expanded) {
            (true, true) if !loading => self.tree.focus_next(),
            (true, false) => self.activate_focused(),
            _ => {}
        }
    }

    /// Collapse the focused directory, or move to its parent.
    pub fn collapse_focused(&mut self) {
        let expanded = self
            .tree
            .focused()
            .and_then(|id| self.tree.node(id))
            .is_some_and(|n| n.expanded && !n.loading);
        if expanded {
            self.activate_focused();
        } else {
            self.tree.focus_parent();
        }
    }

    pub fn scroll_wheel(&mut self, down: bool) {
        let rows = i64::from(self.config.wheel_rows());
        self.tree.scroll_rows(if down { rows } else { -rows });
    }

    pub fn scroll_page(&mut self, down: bool) {
        let rows = self.tree.window().capacity().saturating_sub(1).max(1) as i64;
        self.tree.scroll_rows(if down { rows } else { -rows });
    }

    /// Keep the render window as tall as the tree panel.
    pub fn resize_tree(&mut self, rows: u16) {
        let rows = usize::from(rows).max(1);
        if rows != self.tree.window().capacity() {
            self.tree.set_viewport_capacity(rows);
        }
    }

    pub fn window_command(&mut self, command: WindowCommand) {
        tracing::debug!(?command, "window command");
        match command {
            WindowCommand::Minimize => self.minimized = true,
            WindowCommand::ToggleMaximize => self.maximized = !self.maximized,
            WindowCommand::Close => self.quit(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            _ => AppMode::Help,
        };
    }

    /// Open the path prompt, prefilled with the current root.
    pub fn open_path_prompt(&mut self) {
        let input = self
            .root_path()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        self.dialog_state = DialogState {
            cursor_position: input.len(),
            input,
        };
        self.mode = AppMode::PathPrompt;
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Open the typed path and close the prompt.
    pub fn submit_path_prompt(&mut self) {
        let input = std::mem::take(&mut self.dialog_state.input);
        self.close_dialog();
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return;
        }
        self.open_path_reporting(&expand_home(trimmed));
    }

    /// Insert a character at the current cursor position.
    pub fn dialog_input_char(&mut self, c: char) {
        self.dialog_state
            .input
            .insert(self.dialog_state.cursor_position, c);
        self.dialog_state.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn dialog_delete_char(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
            self.dialog_state
                .input
                .remove(self.dialog_state.cursor_position);
        }
    }

    pub fn dialog_move_cursor_left(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
        }
    }

    pub fn dialog_move_cursor_right(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(next) = self.dialog_state.input[pos..].chars().next() {
            self.dialog_state.cursor_position += next.len_utf8();
        }
    }

    pub fn dialog_cursor_home(&mut self) {
        self.dialog_state.cursor_position = 0;
    }

    pub fn dialog_cursor_end(&mut self) {
        self.dialog_state.cursor_position = self.dialog_state.input.len();
    }

    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some(StatusMessage {
            text: msg,
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_status_error(&mut self, msg: String) {
        self.status_message = Some(StatusMessage {
            text: msg,
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|m| m.created.elapsed() > STATUS_TIMEOUT)
        {
            self.status_message = None;
        }
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(input: &str) -> PathBuf {
    match input.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(input),
        },
        _ => PathBuf::from(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneralConfig, TreeConfig, WatcherConfig};
    use crate::fs::discovery::discover_path;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn config(watcher: bool) -> AppConfig {
        AppConfig {
            watcher: WatcherConfig {
                enabled: Some(watcher),
                debounce_ms: Some(50),
            },
            tree: TreeConfig {
                viewport_capacity: Some(4),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn setup_app() -> (TempDir, App, mpsc::UnboundedReceiver<Event>) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        File::create(dir.path().join("alpha").join("inner.txt")).unwrap();
        File::create(dir.path().join("file_a.txt")).unwrap();
        File::create(dir.path().join("file_b.rs")).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(config(false), tx);
        (dir, app, rx)
    }

    /// Run every pending discovery to completion, as the event loop would.
    async fn settle(app: &mut App) {
        loop {
            let pending = app.take_pending_discoveries();
            if pending.is_empty() {
                break;
            }
            for request in pending {
                let result = discover_path(&request.path, true).await;
                app.handle_discovered(request.node, result);
            }
        }
    }

    fn row_names(app: &App) -> Vec<String> {
        app.tree.window_nodes().map(|(_, n)| n.name.clone()).collect()
    }

    #[test]
    fn starts_without_project() {
        let (_dir, app, _rx) = setup_app();
        assert_eq!(app.tree.root_node().name, "No Project loaded");
        assert!(app.root_path().is_none());
        assert!(!app.maximized);
    }

    #[test]
    fn start_maximized_from_config() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let cfg = AppConfig {
            general: GeneralConfig {
                start_maximized: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(App::new(cfg, tx).maximized);
    }

    #[tokio::test]
    async fn open_path_loads_root() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(dir.path()).unwrap();
        assert_eq!(app.pending.len(), 1);

        settle(&mut app).await;
        let root_name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(
            row_names(&app),
            vec![root_name.as_str(), "alpha", "beta", "file_a.txt"]
        );
        assert_eq!(app.tree.window().node_count(), 5);
        assert!(app.take_pending_discoveries().is_empty());
    }

    #[test]
    fn empty_path_is_noop() {
        let (_dir, mut app, _rx) = setup_app();
        app.open_path(Path::new("")).unwrap();
        assert!(app.take_pending_discoveries().is_empty());
    }

    #[tokio::test]
    async fn missing_path_shows_error_child() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(&dir.path().join("nope")).unwrap();
        assert_eq!(app.tree.root_node().name, "nope");
        assert!(!app.is_watching());

        settle(&mut app).await;
        let rows = row_names(&app);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "nope");
        assert!(rows[1].starts_with("Error: "));
        assert!(app.tree.root_node().loaded);
        assert_eq!(app.tree.root_node().children.len(), 1);
    }

    #[tokio::test]
    async fn file_root_shows_error_child() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(&dir.path().join("file_a.txt")).unwrap();
        settle(&mut app).await;
        let rows = row_names(&app);
        assert_eq!(rows[0], "file_a.txt");
        assert_eq!(rows.len(), 2);
        assert!(rows[1].starts_with("Error: "));
    }

    #[tokio::test]
    async fn click_row_expands_directory() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(dir.path()).unwrap();
        settle(&mut app).await;

        app.click_row(1);
        assert_eq!(row_names(&app)[2], "loading...");
        settle(&mut app).await;
        assert_eq!(row_names(&app)[1..3], ["alpha", "inner.txt"]);

        app.click_row(1);
        assert_eq!(row_names(&app)[1..3], ["alpha", "beta"]);
    }

    #[tokio::test]
    async fn keyboard_expand_and_collapse() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(dir.path()).unwrap();
        settle(&mut app).await;

        app.tree.focus_next();
        app.expand_focused();
        settle(&mut app).await;
        let alpha = app.tree.focused().unwrap();
        assert!(app.tree.node(alpha).unwrap().expanded);

        app.expand_focused();
        let inner = app.tree.focused().unwrap();
        assert_eq!(app.tree.node(inner).unwrap().name, "inner.txt");

        app.collapse_focused();
        assert_eq!(app.tree.focused(), Some(alpha));
        app.collapse_focused();
        assert!(!app.tree.node(alpha).unwrap().expanded);
    }

    #[tokio::test]
    async fn wheel_scrolls_by_configured_rows() {
        let (dir, mut app, _rx) = setup_app();
        for i in 0..10 {
            File::create(dir.path().join(format!("z{i}.txt"))).unwrap();
        }
        app.open_path(dir.path()).unwrap();
        settle(&mut app).await;

        app.scroll_wheel(true);
        assert_eq!(app.tree.window().top_index(), 3);
        app.scroll_wheel(false);
        assert_eq!(app.tree.window().top_index(), 0);
    }

    #[test]
    fn resize_changes_capacity() {
        let (_dir, mut app, _rx) = setup_app();
        app.resize_tree(20);
        assert_eq!(app.tree.window().capacity(), 20);
        app.resize_tree(0);
        assert_eq!(app.tree.window().capacity(), 1);
    }

    #[tokio::test]
    async fn reopen_drops_stale_results() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(dir.path()).unwrap();
        let stale = app.take_pending_discoveries();

        app.open_path(&dir.path().join("alpha")).unwrap();
        for request in stale {
            let result = discover_path(&request.path, true).await;
            app.handle_discovered(request.node, result);
        }
        assert_eq!(row_names(&app), vec!["alpha", "loading..."]);

        settle(&mut app).await;
        assert_eq!(row_names(&app), vec!["alpha", "inner.txt"]);
    }

    #[tokio::test]
    async fn watcher_is_replaced_on_reopen() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(config(true), tx);

        app.open_path(dir.path()).unwrap();
        assert!(app.is_watching());
        let sub = dir.path().join("sub");
        app.open_path(&sub).unwrap();
        assert!(app.is_watching());
        assert_eq!(app.watcher.as_ref().unwrap().root(), sub.as_path());

        // Outside the new root: only the cancelled watcher could see this.
        fs::write(dir.path().join("outside.txt"), "x").unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        while let Ok(event) = rx.try_recv() {
            if let Event::FsChange(paths) = event {
                assert!(
                    paths.iter().all(|p| p.starts_with(&sub)),
                    "old root still reported {paths:?}"
                );
            }
        }

        fs::write(sub.join("inside.txt"), "x").unwrap();
        let reported = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(Event::FsChange(paths)) => break paths,
                    Some(_) => continue,
                    None => panic!("event channel closed"),
                }
            }
        })
        .await
        .unwrap();
        assert!(reported.iter().all(|p| p.starts_with(&sub)));
    }

    #[test]
    fn fs_change_does_not_touch_tree() {
        let (_dir, mut app, _rx) = setup_app();
        let before = app.tree.window().node_count();
        app.handle_fs_change(vec![PathBuf::from("/tmp/x")]);
        assert_eq!(app.fs_changes, 1);
        assert_eq!(app.tree.window().node_count(), before);
    }

    #[test]
    fn window_commands() {
        let (_dir, mut app, _rx) = setup_app();
        app.window_command(WindowCommand::ToggleMaximize);
        assert!(app.maximized);
        app.window_command(WindowCommand::ToggleMaximize);
        assert!(!app.maximized);
        app.window_command(WindowCommand::Minimize);
        assert!(app.minimized);
        app.window_command(WindowCommand::Close);
        assert!(app.should_quit);
    }

    #[test]
    fn path_prompt_prefills_root() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(dir.path()).unwrap();
        app.open_path_prompt();
        assert_eq!(app.mode, AppMode::PathPrompt);
        assert_eq!(app.dialog_state.input, dir.path().to_string_lossy());
        assert_eq!(app.dialog_state.cursor_position, app.dialog_state.input.len());
    }

    #[test]
    fn path_prompt_submit_opens_path() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path_prompt();
        for c in dir.path().join("beta").to_string_lossy().chars() {
            app.dialog_input_char(c);
        }
        app.submit_path_prompt();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.tree.root_node().name, "beta");
        assert_eq!(app.take_pending_discoveries().len(), 1);
        let msg = app.status_message.as_ref().unwrap();
        assert!(!msg.is_error);
        assert!(msg.text.starts_with("Opened "));
    }

    #[tokio::test]
    async fn path_prompt_bad_path_shows_error_in_tree() {
        let (_dir, mut app, _rx) = setup_app();
        app.open_path_prompt();
        for c in "/definitely/not/here".chars() {
            app.dialog_input_char(c);
        }
        app.submit_path_prompt();
        assert_eq!(app.root_path(), Some(Path::new("/definitely/not/here")));
        assert_eq!(app.tree.root_node().name, "here");

        settle(&mut app).await;
        let rows = row_names(&app);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].starts_with("Error: "));
        assert!(app.status_message.as_ref().is_some_and(|m| !m.is_error));
    }

    #[test]
    fn open_parent_moves_root_up() {
        let (dir, mut app, _rx) = setup_app();
        app.open_path(&dir.path().join("alpha")).unwrap();
        app.open_parent();
        assert_eq!(app.root_path(), Some(dir.path()));
    }

    #[test]
    fn dialog_editing() {
        let (_dir, mut app, _rx) = setup_app();
        app.open_path_prompt();
        app.dialog_input_char('a');
        app.dialog_input_char('é');
        app.dialog_input_char('c');
        assert_eq!(app.dialog_state.input, "aéc");
        assert_eq!(app.dialog_state.cursor_position, 4);

        app.dialog_move_cursor_left();
        app.dialog_move_cursor_left();
        assert_eq!(app.dialog_state.cursor_position, 1);
        app.dialog_delete_char();
        assert_eq!(app.dialog_state.input, "éc");
        app.dialog_delete_char();
        assert_eq!(app.dialog_state.input, "éc");

        app.dialog_cursor_end();
        assert_eq!(app.dialog_state.cursor_position, 3);
        app.dialog_move_cursor_right();
        assert_eq!(app.dialog_state.cursor_position, 3);
        app.dialog_cursor_home();
        assert_eq!(app.dialog_state.cursor_position, 0);

        app.close_dialog();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.dialog_state.input.is_empty());
    }

    #[test]
    fn status_message_expires() {
        let (_dir, mut app, _rx) = setup_app();
        app.set_status_message("fresh".to_string());
        app.clear_expired_status();
        assert!(app.status_message.is_some());

        app.status_message = Some(StatusMessage {
            text: "old".to_string(),
            is_error: false,
            created: Instant::now() - Duration::from_secs(5),
        });
        app.clear_expired_status();
        assert!(app.status_message.is_none());
    }

    #[test]
    fn toggle_help() {
        let (_dir, mut app, _rx) = setup_app();
        app.toggle_help();
        assert_eq!(app.mode, AppMode::Help);
        app.toggle_help();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn expand_home_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/src"), home.join("src"));
        }
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
        assert_eq!(expand_home("/abs"), PathBuf::from("/abs"));
    }
}
