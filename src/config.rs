//! Layered TOML configuration for the tree panel.
//!
//! Sources, strongest first; a `Some` in a stronger source replaces the value
//! from a weaker one:
//! 1. CLI flags (`--no-watcher`, `--no-icons`, `--no-mouse`)
//! 2. the file named by `--config`
//! 3. the file named by `$TREE_PANEL_CONFIG`
//! 4. `.tree-panel.toml` in the working directory
//! 5. `<config dir>/tree-panel/config.toml`
//! 6. built-in defaults (applied by the getters)

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::tree::TreeSettings;

pub const CONFIG_ENV: &str = "TREE_PANEL_CONFIG";
const LOCAL_FILE: &str = ".tree-panel.toml";

pub const DEFAULT_ROW_HEIGHT: u32 = 1;
pub const DEFAULT_INDENT_PER_LEVEL: u16 = 2;
pub const DEFAULT_VIEWPORT_CAPACITY: usize = 10;
pub const DEFAULT_WHEEL_ROWS: u32 = 3;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// `[general]`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory opened when no path is given on the command line.
    pub default_path: Option<String>,
    pub mouse: Option<bool>,
    /// Start with the title and status bars hidden.
    pub start_maximized: Option<bool>,
}

/// `[tree]`: sizes are display units, one terminal row being 1.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    pub row_height: Option<u32>,
    pub indent_per_level: Option<u16>,
    /// Window size used until the first draw measures the panel.
    pub viewport_capacity: Option<usize>,
    pub wheel_rows: Option<u32>,
    /// Nerd font glyphs instead of ASCII markers.
    pub use_icons: Option<bool>,
    pub dirs_first: Option<bool>,
    /// Collapsing a directory whose listing failed lets the next expand retry.
    pub retry_failed: Option<bool>,
}

/// `[watcher]`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    pub enabled: Option<bool>,
    pub debounce_ms: Option<u64>,
}

/// `[theme.custom]`: hex colors (`#rrggbb`) laid over the dark palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_fg: Option<String>,
    pub tree_focused_bg: Option<String>,
    pub tree_focused_fg: Option<String>,
    pub tree_dir_fg: Option<String>,
    pub tree_file_fg: Option<String>,
    pub tree_synthetic_fg: Option<String>,
    pub title_bg: Option<String>,
    pub title_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// `[theme]`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// `"dark"`, `"light"` or `"custom"`.
    pub scheme: Option<String>,
    pub custom: Option<ThemeColorsConfig>,
}

/// One configuration source. Every field is optional so sources can be
/// layered with [`AppConfig::merge`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub watcher: WatcherConfig,
    pub theme: ThemeConfig,
}

impl GeneralConfig {
    fn merge(self, over: &Self) -> Self {
        Self {
            default_path: over.default_path.clone().or(self.default_path),
            mouse: over.mouse.or(self.mouse),
            start_maximized: over.start_maximized.or(self.start_maximized),
        }
    }
}

impl TreeConfig {
    fn merge(self, over: &Self) -> Self {
        Self {
            row_height: over.row_height.or(self.row_height),
            indent_per_level: over.indent_per_level.or(self.indent_per_level),
            viewport_capacity: over.viewport_capacity.or(self.viewport_capacity),
            wheel_rows: over.wheel_rows.or(self.wheel_rows),
            use_icons: over.use_icons.or(self.use_icons),
            dirs_first: over.dirs_first.or(self.dirs_first),
            retry_failed: over.retry_failed.or(self.retry_failed),
        }
    }
}

impl WatcherConfig {
    fn merge(self, over: &Self) -> Self {
        Self {
            enabled: over.enabled.or(self.enabled),
            debounce_ms: over.debounce_ms.or(self.debounce_ms),
        }
    }
}

impl ThemeConfig {
    fn merge(self, over: &Self) -> Self {
        Self {
            scheme: over.scheme.clone().or(self.scheme),
            custom: over.custom.clone().or(self.custom),
        }
    }
}

/// Files consulted on every start, weakest first.
fn discovered_files() -> Vec<PathBuf> {
    let global = dirs::config_dir().map(|d| d.join("tree-panel").join("config.toml"));
    let local = std::env::current_dir().ok().map(|cwd| cwd.join(LOCAL_FILE));
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    [global, local, from_env].into_iter().flatten().collect()
}

/// Parse one config file. A missing file is silently skipped; a file that
/// fails to parse is logged and skipped.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str::<AppConfig>(&content)
        .inspect(|_| tracing::debug!(path = %path.display(), "config loaded"))
        .inspect_err(|err| tracing::warn!(path = %path.display(), %err, "config ignored"))
        .ok()
}

impl AppConfig {
    /// Layer `over` on top of `self`.
    pub fn merge(self, over: &AppConfig) -> AppConfig {
        AppConfig {
            general: self.general.merge(&over.general),
            tree: self.tree.merge(&over.tree),
            watcher: self.watcher.merge(&over.watcher),
            theme: self.theme.merge(&over.theme),
        }
    }

    /// Resolve the effective configuration from every source.
    pub fn load(explicit: Option<&Path>, flags: Option<&AppConfig>) -> AppConfig {
        let mut config = discovered_files()
            .iter()
            .filter_map(|path| load_file(path))
            .fold(AppConfig::default(), |acc, file| acc.merge(&file));

        if let Some(path) = explicit {
            match load_file(path) {
                Some(file) => config = config.merge(&file),
                None => tracing::warn!(path = %path.display(), "--config file not loaded"),
            }
        }
        match flags {
            Some(flags) => config.merge(flags),
            None => config,
        }
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn start_maximized(&self) -> bool {
        self.general.start_maximized.unwrap_or(false)
    }

    pub fn row_height(&self) -> u32 {
        self.tree.row_height.unwrap_or(DEFAULT_ROW_HEIGHT).max(1)
    }

    pub fn indent_per_level(&self) -> u16 {
        self.tree.indent_per_level.unwrap_or(DEFAULT_INDENT_PER_LEVEL)
    }

    pub fn viewport_capacity(&self) -> usize {
        self.tree
            .viewport_capacity
            .unwrap_or(DEFAULT_VIEWPORT_CAPACITY)
            .max(1)
    }

    pub fn wheel_rows(&self) -> u32 {
        self.tree.wheel_rows.unwrap_or(DEFAULT_WHEEL_ROWS)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(true)
    }

    pub fn dirs_first(&self) -> bool {
        self.tree.dirs_first.unwrap_or(true)
    }

    pub fn retry_failed(&self) -> bool {
        self.tree.retry_failed.unwrap_or(true)
    }

    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    /// Settings handed to the tree engine.
    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings {
            row_height: self.row_height(),
            indent_per_level: self.indent_per_level(),
            viewport_capacity: self.viewport_capacity(),
            retry_failed: self.retry_failed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_terminal_units() {
        let cfg = AppConfig::default();
        assert!(cfg.mouse_enabled());
        assert!(!cfg.start_maximized());
        assert_eq!(cfg.row_height(), 1);
        assert_eq!(cfg.indent_per_level(), 2);
        assert_eq!(cfg.viewport_capacity(), 10);
        assert_eq!(cfg.wheel_rows(), 3);
        assert!(cfg.use_icons());
        assert!(cfg.dirs_first());
        assert!(cfg.retry_failed());
        assert!(cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 300);
        assert_eq!(cfg.theme_scheme(), "dark");
        assert_eq!(cfg.tree_settings(), TreeSettings::default());
    }

    #[test]
    fn every_section_parses() {
        let source = r#"
[general]
default_path = "/srv/project"
mouse = false
start_maximized = true

[tree]
row_height = 31
indent_per_level = 24
viewport_capacity = 20
wheel_rows = 5
use_icons = false
dirs_first = false
retry_failed = false

[watcher]
enabled = false
debounce_ms = 750

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(source).unwrap();
        assert_eq!(cfg.general.default_path.as_deref(), Some("/srv/project"));
        assert!(!cfg.mouse_enabled());
        assert!(cfg.start_maximized());
        assert_eq!(
            cfg.tree_settings(),
            TreeSettings {
                row_height: 31,
                indent_per_level: 24,
                viewport_capacity: 20,
                retry_failed: false,
            }
        );
        assert_eq!(cfg.wheel_rows(), 5);
        assert!(!cfg.use_icons());
        assert!(!cfg.dirs_first());
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 750);
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("[tree]\nwheel_rows = 1\n").unwrap();
        assert_eq!(cfg.wheel_rows(), 1);
        assert_eq!(cfg.row_height(), 1);
        assert!(cfg.watcher_enabled());
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let cfg: AppConfig =
            toml::from_str("[tree]\nrow_height = 0\nviewport_capacity = 0\n").unwrap();
        assert_eq!(cfg.row_height(), 1);
        assert_eq!(cfg.viewport_capacity(), 1);
    }

    #[test]
    fn stronger_layer_wins_per_field() {
        let weak = AppConfig {
            tree: TreeConfig {
                row_height: Some(2),
                wheel_rows: Some(4),
                ..Default::default()
            },
            watcher: WatcherConfig {
                enabled: Some(false),
                debounce_ms: Some(900),
            },
            ..Default::default()
        };
        let strong = AppConfig {
            tree: TreeConfig {
                row_height: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = weak.merge(&strong);
        assert_eq!(merged.row_height(), 3);
        assert_eq!(merged.wheel_rows(), 4);
        assert!(!merged.watcher_enabled());
        assert_eq!(merged.debounce_ms(), 900);
    }

    #[test]
    fn unreadable_files_are_skipped() {
        assert!(load_file(Path::new("/nonexistent/tree-panel.toml")).is_none());

        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[tree\nrow_height = ").unwrap();
        assert!(load_file(&broken).is_none());
    }

    #[test]
    fn flags_override_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.toml");
        std::fs::write(&path, "[tree]\nuse_icons = true\nindent_per_level = 4\n").unwrap();

        let flags = AppConfig {
            tree: TreeConfig {
                use_icons: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&path), Some(&flags));
        assert!(!cfg.use_icons());
        assert_eq!(cfg.indent_per_level(), 4);
    }

    #[test]
    fn custom_palette_section() {
        let source = r##"
[theme]
scheme = "custom"

[theme.custom]
tree_focused_bg = "#313244"
title_fg = "#f5e0dc"
"##;
        let cfg: AppConfig = toml::from_str(source).unwrap();
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.unwrap();
        assert_eq!(custom.tree_focused_bg.as_deref(), Some("#313244"));
        assert_eq!(custom.title_fg.as_deref(), Some("#f5e0dc"));
        assert!(custom.dialog_bg.is_none());
    }
}
