use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::DialogState;
use crate::theme::ThemeColors;

/// Centered modal asking for a directory to open.
pub struct PathPromptWidget<'a> {
    state: &'a DialogState,
    theme: &'a ThemeColors,
}

impl<'a> PathPromptWidget<'a> {
    pub fn new(state: &'a DialogState, theme: &'a ThemeColors) -> Self {
        Self { state, theme }
    }

    fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width.min(area.width), height.min(area.height))
    }

    /// Split the input around the cursor: text before, the character under
    /// the cursor (a space at the end), and the rest.
    fn split_at_cursor(&self) -> (&'a str, &'a str, &'a str) {
        let state: &'a DialogState = self.state;
        let input = state.input.as_str();
        let pos = self.state.cursor_position.min(input.len());
        match input[pos..].chars().next() {
            Some(c) => {
                let end = pos + c.len_utf8();
                (&input[..pos], &input[pos..end], &input[end..])
            }
            None => (input, " ", ""),
        }
    }
}

impl<'a> Widget for PathPromptWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 60.min(area.width.saturating_sub(4));
        let rect = Self::centered_rect(width, 5, area);
        Clear.render(rect, buf);

        let block = Block::default()
            .title(" Open Directory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let (before, cursor, after) = self.split_at_cursor();

        // Keep the cursor visible by dropping characters from the left.
        let max = usize::from(inner.width).saturating_sub(1);
        let before_chars = before.chars().count();
        let before_display: String = if before_chars > max {
            before.chars().skip(before_chars - max).collect()
        } else {
            before.to_string()
        };

        let input_style = Style::default().fg(self.theme.tree_fg);
        let cursor_style = Style::default()
            .bg(self.theme.tree_fg)
            .fg(self.theme.dialog_bg)
            .add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled(before_display, input_style),
            Span::styled(cursor, cursor_style),
            Span::styled(after, input_style),
        ]);
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);

        if inner.height > 1 {
            let hint = Line::from(Span::styled(
                "[Enter] Open  [Esc] Cancel",
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ));
            buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn prompt_renders_title_and_input() {
        let tc = theme::dark_theme();
        let state = DialogState {
            input: "/home/me/proj".to_string(),
            cursor_position: 13,
        };
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        PathPromptWidget::new(&state, &tc).render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Open Directory"));
        assert!(content.contains("/home/me/proj"));
        assert!(content.contains("[Enter] Open"));
    }

    #[test]
    fn cursor_splits_multibyte_input() {
        let tc = theme::dark_theme();
        let state = DialogState {
            input: "aéb".to_string(),
            cursor_position: 1,
        };
        let widget = PathPromptWidget::new(&state, &tc);
        assert_eq!(widget.split_at_cursor(), ("a", "é", "b"));

        let end = DialogState {
            input: "ab".to_string(),
            cursor_position: 2,
        };
        let widget = PathPromptWidget::new(&end, &tc);
        assert_eq!(widget.split_at_cursor(), ("ab", " ", ""));
    }

    #[test]
    fn long_input_keeps_tail_visible() {
        let tc = theme::dark_theme();
        let input = format!("/{}", "x".repeat(100)) + "/tail";
        let state = DialogState {
            cursor_position: input.len(),
            input,
        };
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        PathPromptWidget::new(&state, &tc).render(area, &mut buf);
        assert!(buffer_to_string(&buf, area).contains("/tail"));
    }
}
