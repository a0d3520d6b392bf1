use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, LayoutAreas};
use crate::components::dialog::PathPromptWidget;
use crate::components::help::HelpOverlay;
use crate::components::status_bar::StatusBarWidget;
use crate::components::title_bar::TitleBarWidget;
use crate::components::tree::TreeWidget;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let title = app.tree.root_node().name.clone();

    if app.minimized {
        let bar = Rect::new(area.x, area.y, area.width, area.height.min(1));
        app.layout = LayoutAreas {
            title_bar: bar,
            tree: Rect::default(),
        };
        frame.render_widget(TitleBarWidget::new(&title, &app.theme), bar);
        return;
    }

    let (title_area, tree_area, status_area) = if app.maximized {
        (Rect::default(), area, Rect::default())
    } else {
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
        (chunks[0], chunks[1], chunks[2])
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_fg));
    let tree_inner = block.inner(tree_area);
    app.layout = LayoutAreas {
        title_bar: title_area,
        tree: tree_inner,
    };

    // The render window holds exactly as many nodes as fit on screen.
    app.resize_tree(tree_inner.height);

    if !app.maximized {
        frame.render_widget(TitleBarWidget::new(&title, &app.theme), title_area);
    }

    let use_icons = app.config.use_icons();
    frame.render_widget(
        TreeWidget::new(&app.tree, &app.theme, use_icons).block(block),
        tree_area,
    );

    if !app.maximized {
        render_status_bar(app, frame, status_area);
    }

    match app.mode {
        AppMode::PathPrompt => {
            frame.render_widget(PathPromptWidget::new(&app.dialog_state, &app.theme), area);
        }
        AppMode::Help => frame.render_widget(HelpOverlay::new(&app.theme), area),
        AppMode::Normal => {}
    }
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let path = app
        .root_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let info = node_info(app);
    let mut widget = StatusBarWidget::new(&path, &info, &app.theme);

    if let Some(msg) = &app.status_message {
        widget = widget.status_message(&msg.text, msg.is_error);
    }
    if app.config.watcher_enabled() && !app.is_watching() && app.root_path().is_some() {
        widget = widget.watcher_status("[watch off]");
    }
    frame.render_widget(widget, area);
}

/// Kind of the focused node and its position in the visible sequence.
fn node_info(app: &App) -> String {
    let total = app.tree.window().node_count();
    let Some(id) = app.tree.focused() else {
        return format!("{total} rows");
    };
    let kind = match app.tree.node(id) {
        Some(node) if node.is_synthetic() => "-".to_string(),
        Some(node) if node.is_dir() => "dir".to_string(),
        Some(node) if !node.file_type().is_empty() => node.file_type().to_string(),
        Some(_) => "file".to_string(),
        None => return format!("{total} rows"),
    };
    let position = app
        .tree
        .logical_index(id)
        .map(|i| format!("{}/{total}", i + 1))
        .unwrap_or_else(|| format!("-/{total}"));
    format!("{kind} {position}")
}
