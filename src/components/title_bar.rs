use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::WindowCommand;
use crate::theme::ThemeColors;

const BUTTON_WIDTH: u16 = 3;

/// Buttons in display order, right-aligned.
const BUTTONS: [(WindowCommand, &str); 3] = [
    (WindowCommand::Minimize, " _ "),
    (WindowCommand::ToggleMaximize, " □ "),
    (WindowCommand::Close, " × "),
];

/// Title bar with the root name and the minimize/maximize/close buttons.
pub struct TitleBarWidget<'a> {
    title: &'a str,
    theme: &'a ThemeColors,
}

impl<'a> TitleBarWidget<'a> {
    pub fn new(title: &'a str, theme: &'a ThemeColors) -> Self {
        Self { title, theme }
    }

    /// Which button, if any, sits at column `x` of a title bar drawn in `area`.
    pub fn button_at(area: Rect, x: u16, y: u16) -> Option<WindowCommand> {
        let buttons_width = BUTTON_WIDTH * BUTTONS.len() as u16;
        if y != area.y || area.width < buttons_width {
            return None;
        }
        let start = area.x + area.width - buttons_width;
        if x < start || x >= area.x + area.width {
            return None;
        }
        BUTTONS
            .get(usize::from((x - start) / BUTTON_WIDTH))
            .map(|(cmd, _)| *cmd)
    }
}

impl<'a> Widget for TitleBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let base = Style::default().bg(self.theme.title_bg).fg(self.theme.title_fg);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), base);

        let title = Line::from(Span::styled(
            format!(" {} ", self.title),
            base.add_modifier(Modifier::BOLD),
        ));
        buf.set_line(area.x, area.y, &title, area.width);

        let buttons_width = BUTTON_WIDTH * BUTTONS.len() as u16;
        if area.width < buttons_width {
            return;
        }
        let mut x = area.x + area.width - buttons_width;
        for (cmd, label) in BUTTONS {
            let style = match cmd {
                WindowCommand::Close => base.fg(self.theme.error_fg),
                _ => base.fg(self.theme.accent_fg),
            };
            buf.set_string(x, area.y, label, style);
            x += BUTTON_WIDTH;
        }
    }
}
