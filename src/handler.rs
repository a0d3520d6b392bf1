use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{App, AppMode, WindowCommand};
use crate::components::title_bar::TitleBarWidget;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if app.minimized {
        app.minimized = false;
        return;
    }
    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::PathPrompt => handle_prompt_mode(app, key),
        AppMode::Help => handle_help_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Char('j') | KeyCode::Down => app.tree.focus_next(),
        KeyCode::Char('k') | KeyCode::Up => app.tree.focus_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.tree.focus_first(),
        KeyCode::Char('G') | KeyCode::End => app.tree.focus_last(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_focused(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_focused(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_focused(),
        KeyCode::PageDown => app.scroll_page(true),
        KeyCode::PageUp => app.scroll_page(false),

        KeyCode::Backspace | KeyCode::Char('u') => app.open_parent(),
        KeyCode::Char('o') => app.open_path_prompt(),

        KeyCode::Char('m') | KeyCode::F(11) => app.window_command(WindowCommand::ToggleMaximize),
        KeyCode::Char('z') => app.window_command(WindowCommand::Minimize),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

fn handle_prompt_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_path_prompt(),
        KeyCode::Backspace => app.dialog_delete_char(),
        KeyCode::Left => app.dialog_move_cursor_left(),
        KeyCode::Right => app.dialog_move_cursor_right(),
        KeyCode::Home => app.dialog_cursor_home(),
        KeyCode::End => app.dialog_cursor_end(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.close_dialog(),
        KeyCode::Char(c) => app.dialog_input_char(c),
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
        app.toggle_help();
    }
}

/// Handle a mouse event against the areas of the last draw.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    let pos = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.minimized {
                app.minimized = false;
                return;
            }
            if app.mode != AppMode::Normal {
                return;
            }
            if app.layout.title_bar.contains(pos) {
                if let Some(command) =
                    TitleBarWidget::button_at(app.layout.title_bar, mouse.column, mouse.row)
                {
                    app.window_command(command);
                }
            } else if app.layout.tree.contains(pos) {
                app.click_row(usize::from(mouse.row - app.layout.tree.y));
            }
        }
        MouseEventKind::Down(MouseButton::Right)
            if app.mode == AppMode::Normal && app.layout.tree.contains(pos) =>
        {
            app.tree.focus_index(usize::from(mouse.row - app.layout.tree.y));
        }
        MouseEventKind::ScrollDown if app.layout.tree.contains(pos) => app.scroll_wheel(true),
        MouseEventKind::ScrollUp if app.layout.tree.contains(pos) => app.scroll_wheel(false),
        _ => {}
    }
}
