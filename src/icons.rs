//! Static icon registration: symbolic icon keys and their glyphs.
//!
//! Discovery tags every entry with a key (`"folder"`, `"rust"`, ...). The tree
//! widget resolves the key here, either to a Nerd Font glyph or to an ASCII tag.

use crate::tree::PrefixIcon;

pub const FOLDER: &str = "folder";
pub const FOLDER_OPEN: &str = "folder_open";
pub const DESCRIPTION: &str = "description";
pub const LOADING: &str = "loading";
pub const ERROR: &str = "error";

struct IconEntry {
    key: &'static str,
    nerd: &'static str,
    ascii: &'static str,
}

const REGISTRY: &[IconEntry] = &[
    IconEntry { key: FOLDER, nerd: "\u{f07b} ", ascii: "[D] " },
    IconEntry { key: FOLDER_OPEN, nerd: "\u{f07c} ", ascii: "[D] " },
    IconEntry { key: DESCRIPTION, nerd: "\u{f15b} ", ascii: "[F] " },
    IconEntry { key: LOADING, nerd: "\u{f110} ", ascii: "... " },
    IconEntry { key: ERROR, nerd: "\u{f071} ", ascii: "[!] " },
    IconEntry { key: "rust", nerd: "\u{e7a8} ", ascii: "[F] " },
    IconEntry { key: "python", nerd: "\u{e606} ", ascii: "[F] " },
    IconEntry { key: "javascript", nerd: "\u{e74e} ", ascii: "[F] " },
    IconEntry { key: "typescript", nerd: "\u{e628} ", ascii: "[F] " },
    IconEntry { key: "web", nerd: "\u{e736} ", ascii: "[F] " },
    IconEntry { key: "data", nerd: "\u{e60b} ", ascii: "[F] " },
    IconEntry { key: "markdown", nerd: "\u{e609} ", ascii: "[F] " },
    IconEntry { key: "shell", nerd: "\u{f489} ", ascii: "[F] " },
    IconEntry { key: "image", nerd: "\u{f1c5} ", ascii: "[I] " },
    IconEntry { key: "archive", nerd: "\u{f410} ", ascii: "[Z] " },
    IconEntry { key: "lock", nerd: "\u{f023} ", ascii: "[F] " },
];

/// Map a lowercase file extension to an icon key.
pub fn key_for_file_type(file_type: &str) -> &'static str {
    match file_type {
        "rs" => "rust",
        "py" => "python",
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "html" | "htm" | "css" | "scss" | "sass" => "web",
        "json" | "toml" | "yaml" | "yml" | "ini" | "cfg" => "data",
        "md" | "markdown" | "rst" => "markdown",
        "sh" | "bash" | "zsh" | "fish" => "shell",
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" | "ico" | "webp" => "image",
        "zip" | "tar" | "gz" | "xz" | "bz2" | "rar" | "7z" => "archive",
        "lock" => "lock",
        _ => DESCRIPTION,
    }
}

/// Resolve an icon key to its glyph. Unknown keys fall back to the generic file glyph.
pub fn glyph(key: &str, use_icons: bool) -> &'static str {
    let entry = REGISTRY
        .iter()
        .find(|e| e.key == key)
        .or_else(|| REGISTRY.iter().find(|e| e.key == DESCRIPTION));
    match entry {
        Some(e) if use_icons => e.nerd,
        Some(e) => e.ascii,
        None => "",
    }
}

/// Expand/collapse marker drawn before a node's icon.
pub fn prefix_glyph(prefix: PrefixIcon) -> &'static str {
    match prefix {
        PrefixIcon::None => "  ",
        PrefixIcon::Collapsed => "▸ ",
        PrefixIcon::Expanded => "▾ ",
    }
}
