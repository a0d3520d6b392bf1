use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures that reach the host. Discovery failures never do; they are
/// rendered in the tree instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from the terminal or the log directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    /// The filesystem watcher could not be set up for a root path.
    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// A configuration file exists but could not be used.
    #[error("Config error: {0}")]
    Config(String),
}
