use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " o:open  ?:help  q:quit ";

/// Status bar: root path, focused node info and position, watcher state,
/// or a transient status message.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    node_info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    watcher_status: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, node_info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            node_info,
            theme,
            status_message: None,
            is_error: false,
            watcher_status: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    pub fn watcher_status(mut self, status: &'a str) -> Self {
        self.watcher_status = Some(status);
        self
    }
}

/// Keep the last `budget` characters, marking the cut with `...`.
fn truncate_left(s: &str, budget: usize) -> String {
    let len = s.chars().count();
    if len <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().take(budget).collect();
    }
    let tail: String = s.chars().skip(len - (budget - 3)).collect();
    format!("...{tail}")
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        let base = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), base);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                base.bg(self.theme.error_fg)
            } else {
                base.fg(self.theme.success_fg)
            };
            let display: String = msg.chars().take(width).collect();
            let line = Line::from(Span::styled(format!("{display:<width$}"), style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let hints_len = KEY_HINTS.chars().count();
        let watcher = self.watcher_status.unwrap_or("");
        let info_len = self.node_info.chars().count() + watcher.chars().count() + 2;
        let path_budget = width.saturating_sub(hints_len + info_len);
        let path_display = truncate_left(self.path_str, path_budget);

        let mut spans = vec![
            Span::styled(path_display, base),
            Span::raw(" "),
            Span::styled(self.node_info, base.fg(self.theme.accent_fg)),
        ];
        if !watcher.is_empty() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                watcher,
                base.fg(self.theme.warning_fg).add_modifier(Modifier::BOLD),
            ));
        }

        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let pad = width.saturating_sub(used + hints_len);
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(
            KEY_HINTS,
            base.fg(self.theme.dim_fg).add_modifier(Modifier::DIM),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;

    fn content(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn test_normal_bar_rendering() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/home/user/project", "rs 3/12", &tc).render(area, &mut buf);

        let text = content(&buf, 100);
        assert!(text.starts_with("/home/user/project rs 3/12"));
        assert!(text.contains("?:help"));
    }

    #[test]
    fn test_long_path_is_truncated_from_left() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/very/long/path/to/some/deep/project", "1/1", &tc)
            .render(area, &mut buf);

        let text = content(&buf, 40);
        assert!(text.starts_with("..."));
        assert!(text.contains("1/1"));
    }

    #[test]
    fn test_status_message_error() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/p", "", &tc)
            .status_message("Invalid path: /nope", true)
            .render(area, &mut buf);

        assert!(content(&buf, 60).contains("Invalid path: /nope"));
        assert_eq!(buf.cell((0, 0)).unwrap().bg, tc.error_fg);
    }

    #[test]
    fn test_status_message_success() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/p", "", &tc)
            .status_message("Opened", false)
            .render(area, &mut buf);
        assert_eq!(buf.cell((0, 0)).unwrap().fg, tc.success_fg);
    }

    #[test]
    fn test_watcher_status_displayed() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/p", "1/1", &tc)
            .watcher_status("[watch off]")
            .render(area, &mut buf);
        assert!(content(&buf, 80).contains("[watch off]"));
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/path", "info", &tc).render(area, &mut buf);
    }

    #[test]
    fn truncate_left_keeps_tail() {
        assert_eq!(truncate_left("abcdef", 10), "abcdef");
        assert_eq!(truncate_left("abcdefgh", 6), "...fgh");
        assert_eq!(truncate_left("abcdef", 2), "ab");
    }
}
