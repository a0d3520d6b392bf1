mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod icons;
mod logging;
mod theme;
mod tree;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, TreeConfig, WatcherConfig};
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// A lazily loaded file-tree panel for the terminal.
#[derive(Parser, Debug)]
#[command(name = "treepanel", version, about)]
struct Cli {
    /// Directory to open (defaults to the configured path, then `.`)
    path: Option<PathBuf>,

    /// Config file to load on top of the discovered ones
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not watch the root for changes
    #[arg(long)]
    no_watcher: bool,

    /// Use plain text markers instead of icon glyphs
    #[arg(long)]
    no_icons: bool,

    /// Do not capture the mouse
    #[arg(long)]
    no_mouse: bool,
}

impl Cli {
    /// Flags that override every config file.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: self.no_mouse.then_some(false),
                ..Default::default()
            },
            tree: TreeConfig {
                use_icons: self.no_icons.then_some(false),
                ..Default::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(AppError::Config(format!("{} not found", path.display())));
        }
    }
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    let requested = cli
        .path
        .clone()
        .or_else(|| config.general.default_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    // A root that cannot be resolved is still opened; its listing error
    // shows up in the tree.
    let path = requested.canonicalize().unwrap_or(requested);
    tracing::info!(path = %path.display(), "starting");

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(16));
    let event_tx = events.sender();
    let dirs_first = config.dirs_first();

    let mut app = App::new(config, event_tx.clone());
    app.open_path_reporting(&path);

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        for request in app.take_pending_discoveries() {
            fs::discovery::spawn(request, dirs_first, event_tx.clone());
        }

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize => {}
            Event::Discovered { node, result } => app.handle_discovered(node, result),
            Event::FsChange(paths) => app.handle_fs_change(paths),
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    tracing::info!("exiting");
    Ok(())
}
