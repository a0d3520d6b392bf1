use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const TREE_KEYS: &[KeyEntry] = &[
    KeyEntry { key: "j / ↓", description: "Focus next row" },
    KeyEntry { key: "k / ↑", description: "Focus previous row" },
    KeyEntry { key: "g / Home", description: "Focus root" },
    KeyEntry { key: "G / End", description: "Focus last row" },
    KeyEntry { key: "Enter / Space", description: "Expand or collapse" },
    KeyEntry { key: "l / →", description: "Expand / step into directory" },
    KeyEntry { key: "h / ←", description: "Collapse / focus parent" },
    KeyEntry { key: "PgUp / PgDn", description: "Scroll one page" },
    KeyEntry { key: "Wheel", description: "Scroll" },
    KeyEntry { key: "Click", description: "Focus and expand/collapse row" },
    KeyEntry { key: "Right click", description: "Focus row" },
];

const ROOT_KEYS: &[KeyEntry] = &[
    KeyEntry { key: "o", description: "Open a directory" },
    KeyEntry { key: "Backspace / u", description: "Open parent of root" },
];

const WINDOW_KEYS: &[KeyEntry] = &[
    KeyEntry { key: "m / F11", description: "Toggle maximize" },
    KeyEntry { key: "z", description: "Minimize" },
    KeyEntry { key: "?", description: "Toggle this help" },
    KeyEntry { key: "q / Ctrl+C", description: "Quit" },
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory { name: "Tree", entries: TREE_KEYS },
    KeyCategory { name: "Root", entries: ROOT_KEYS },
    KeyCategory { name: "Window", entries: WINDOW_KEYS },
];

/// Help overlay listing every keybinding.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors) -> Self {
        Self { theme }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let header = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default().fg(self.theme.warning_fg);
        let desc_style = Style::default().fg(self.theme.tree_fg);

        let mut lines = Vec::new();
        for category in CATEGORIES {
            lines.push(Line::from(Span::styled(category.name, header)));
            for entry in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<16}", entry.key), key_style),
                    Span::styled(entry.description, desc_style),
                ]));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Esc / ? to close",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 56.min(area.width);
        let lines = self.build_content_lines();
        let height = (lines.len() as u16 + 2).min(area.height);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let rect = Rect::new(x, y, width, height);

        Clear.render(rect, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(rect);
        block.render(rect, buf);

        for (i, line) in lines.iter().take(usize::from(inner.height)).enumerate() {
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(2));
        }
    }
}
