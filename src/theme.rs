//! Static theming: built-in palettes and resolution from config.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

/// Every color the widgets draw with.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_focused_bg: Color,
    pub tree_focused_fg: Color,
    pub tree_dir_fg: Color,
    pub tree_file_fg: Color,
    /// "loading..." rows.
    pub tree_synthetic_fg: Color,

    // Title bar (window chrome)
    pub title_bg: Color,
    pub title_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    pub border_fg: Color,

    // Dialogs
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Fixed per scheme
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

/// The Catppuccin colors the panel draws with.
struct Flavor {
    base: Color,
    surface0: Color,
    surface1: Color,
    surface2: Color,
    overlay0: Color,
    text: Color,
    blue: Color,
    red: Color,
    yellow: Color,
    green: Color,
    mauve: Color,
}

const MOCHA: Flavor = Flavor {
    base: Color::Rgb(0x1e, 0x1e, 0x2e),
    surface0: Color::Rgb(0x31, 0x32, 0x44),
    surface1: Color::Rgb(0x45, 0x47, 0x5a),
    surface2: Color::Rgb(0x58, 0x5b, 0x70),
    overlay0: Color::Rgb(0x6c, 0x70, 0x86),
    text: Color::Rgb(0xcd, 0xd6, 0xf4),
    blue: Color::Rgb(0x89, 0xb4, 0xfa),
    red: Color::Rgb(0xf3, 0x8b, 0xa8),
    yellow: Color::Rgb(0xf9, 0xe2, 0xaf),
    green: Color::Rgb(0xa6, 0xe3, 0xa1),
    mauve: Color::Rgb(0xcb, 0xa6, 0xf7),
};

const LATTE: Flavor = Flavor {
    base: Color::Rgb(0xef, 0xf1, 0xf5),
    surface0: Color::Rgb(0xe6, 0xe9, 0xef),
    surface1: Color::Rgb(0xcc, 0xd0, 0xda),
    surface2: Color::Rgb(0xac, 0xb0, 0xbe),
    overlay0: Color::Rgb(0x9c, 0xa0, 0xb0),
    text: Color::Rgb(0x4c, 0x4f, 0x69),
    blue: Color::Rgb(0x1e, 0x66, 0xf5),
    red: Color::Rgb(0xd2, 0x0f, 0x39),
    yellow: Color::Rgb(0xdf, 0x8e, 0x1d),
    green: Color::Rgb(0x40, 0xa0, 0x2b),
    mauve: Color::Rgb(0x88, 0x39, 0xef),
};

fn from_flavor(f: &Flavor) -> ThemeColors {
    ThemeColors {
        tree_fg: f.text,
        tree_focused_bg: f.surface1,
        tree_focused_fg: f.text,
        tree_dir_fg: f.blue,
        tree_file_fg: f.text,
        tree_synthetic_fg: f.overlay0,
        title_bg: f.surface0,
        title_fg: f.text,
        status_bg: f.base,
        status_fg: f.text,
        border_fg: f.surface2,
        dialog_bg: f.surface0,
        dialog_border_fg: f.blue,
        error_fg: f.red,
        warning_fg: f.yellow,
        success_fg: f.green,
        accent_fg: f.mauve,
        dim_fg: f.overlay0,
    }
}

/// Catppuccin Mocha.
pub fn dark_theme() -> ThemeColors {
    from_flavor(&MOCHA)
}

/// Catppuccin Latte.
pub fn light_theme() -> ThemeColors {
    from_flavor(&LATTE)
}

/// `#rrggbb` or `rrggbb` to an RGB color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

/// Colors for the configured scheme. `"custom"` starts from the dark palette
/// and applies every valid override; unknown schemes fall back to dark.
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    let slots: [(&Option<String>, &mut Color); 13] = [
        (&custom.tree_fg, &mut theme.tree_fg),
        (&custom.tree_focused_bg, &mut theme.tree_focused_bg),
        (&custom.tree_focused_fg, &mut theme.tree_focused_fg),
        (&custom.tree_dir_fg, &mut theme.tree_dir_fg),
        (&custom.tree_file_fg, &mut theme.tree_file_fg),
        (&custom.tree_synthetic_fg, &mut theme.tree_synthetic_fg),
        (&custom.title_bg, &mut theme.title_bg),
        (&custom.title_fg, &mut theme.title_fg),
        (&custom.status_bg, &mut theme.status_bg),
        (&custom.status_fg, &mut theme.status_fg),
        (&custom.border_fg, &mut theme.border_fg),
        (&custom.dialog_bg, &mut theme.dialog_bg),
        (&custom.dialog_border_fg, &mut theme.dialog_border_fg),
    ];
    for (value, slot) in slots {
        if let Some(color) = value.as_deref().and_then(parse_hex_color) {
            *slot = color;
        }
    }
}
