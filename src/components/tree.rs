use ratatui::{
    buffer::Buffer,
    layout::{Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

use crate::icons;
use crate::theme::ThemeColors;
use crate::tree::{NodeKind, TreeNode, TreeState};

/// Renders the tree's render window: one terminal row per buffered node.
pub struct TreeWidget<'a> {
    tree_state: &'a TreeState,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree_state: &'a TreeState, theme: &'a ThemeColors, use_icons: bool) -> Self {
        Self {
            tree_state,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn icon_key(node: &TreeNode) -> &str {
        if node.is_dir() && node.expanded {
            icons::FOLDER_OPEN
        } else {
            node.icon()
        }
    }

    fn row_style(&self, node: &TreeNode, focused: bool) -> Style {
        if focused {
            return Style::default()
                .bg(self.theme.tree_focused_bg)
                .fg(self.theme.tree_focused_fg)
                .add_modifier(Modifier::BOLD);
        }
        match &node.kind {
            NodeKind::Loading => Style::default()
                .fg(self.theme.tree_synthetic_fg)
                .add_modifier(Modifier::ITALIC),
            NodeKind::Error { .. } => Style::default().fg(self.theme.error_fg),
            NodeKind::Entry(e) if e.is_dir => Style::default()
                .fg(self.theme.tree_dir_fg)
                .add_modifier(Modifier::BOLD),
            NodeKind::Entry(_) => Style::default().fg(self.theme.tree_file_fg),
        }
    }

    fn line(&self, node: &TreeNode, focused: bool) -> Line<'a> {
        let style = self.row_style(node, focused);
        Line::from(vec![
            Span::raw(" ".repeat(usize::from(node.level_offset))),
            Span::styled(icons::prefix_glyph(node.prefix_icon), style),
            Span::styled(icons::glyph(Self::icon_key(node), self.use_icons), style),
            Span::styled(node.name.clone(), style),
        ])
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let focused = self.tree_state.focused_index();
        for (row, (_, node)) in self
            .tree_state
            .window_nodes()
            .take(usize::from(inner.height))
            .enumerate()
        {
            let y = inner.y + row as u16;
            let line = self.line(node, Some(row) == focused);
            if Some(row) == focused {
                buf.set_style(
                    Rect::new(inner.x, y, inner.width, 1),
                    Style::default().bg(self.theme.tree_focused_bg),
                );
            }
            buf.set_line(inner.x, y, &line, inner.width);
        }

        let window = self.tree_state.window();
        let row = u64::from(window.row_height());
        let viewport = window.capacity() as u64 * row;
        let scrollable = window.total_extent().saturating_sub(viewport) / row;
        if scrollable > 0 {
            let mut state = ScrollbarState::new(scrollable as usize + 1)
                .viewport_content_length(window.capacity())
                .position((window.offset() / row) as usize);
            Scrollbar::new(ScrollbarOrientation::VerticalRight).render(
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                buf,
                &mut state,
            );
        }
    }
}
