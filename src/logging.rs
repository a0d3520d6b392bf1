use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TREE_PANEL_LOG";

const DEFAULT_FILTER: &str = "tree_panel=info";

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

fn log_dir() -> std::io::Result<PathBuf> {
    let preferred = dirs::data_local_dir()
        .map(|d| d.join("tree-panel").join("logs"))
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no data dir"));
    preferred
        .and_then(|dir| std::fs::create_dir_all(&dir).map(|_| dir))
        .or_else(|_| {
            let dir = std::env::temp_dir().join("tree-panel").join("logs");
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to a daily rolling file.
///
/// Returns `None` when no log directory is usable or a subscriber is already
/// installed. Nothing is ever written to stdout.
pub fn init() -> Option<LoggingGuard> {
    let log_dir = log_dir().ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "treepanel.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(env_filter()).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard { _guard: guard })
}
