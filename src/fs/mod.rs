pub mod discovery;
pub mod watcher;
