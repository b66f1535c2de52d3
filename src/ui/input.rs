//! Input handling.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Focus, Mode};

/// Rows moved by PageUp/PageDown.
const PAGE_ROWS: isize = 20;

/// Handle a crossterm event.
/// Returns true if the event was handled.
pub fn handle_input(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Resize(_, _) => {
            app.mark_dirty();
            true
        }
        _ => false,
    }
}

/// Handle a key event.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.interrupt();
        return true;
    }

    match app.ui.mode {
        Mode::Prompt => return handle_prompt_key(app, key),
        Mode::Help => return handle_help_key(app, key),
        Mode::Normal => {}
    }

    app.clear_messages();

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return true;
        }
        KeyCode::Tab => {
            app.toggle_focus();
            return true;
        }
        KeyCode::Char('?') => {
            app.toggle_help();
            return true;
        }
        KeyCode::Char('f') => {
            app.open_prompt();
            return true;
        }
        KeyCode::Left => {
            app.select_next();
            return true;
        }
        KeyCode::Right => {
            app.select_prev();
            return true;
        }
        _ => {}
    }

    // Focus-specific keys
    match app.focus {
        Focus::Commits => handle_commits_key(app, key),
        Focus::Detail => handle_detail_key(app, key),
    }
}

/// Handle keys when the commit list is focused.
fn handle_commits_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            true
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.select_first();
            true
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.select_last();
            true
        }
        KeyCode::PageDown => {
            app.select_index(app.sidebar.selected_idx + PAGE_ROWS as usize);
            true
        }
        KeyCode::PageUp => {
            app.select_index(app.sidebar.selected_idx.saturating_sub(PAGE_ROWS as usize));
            true
        }
        KeyCode::Char('h') => {
            app.scroll_view(0, -1);
            true
        }
        KeyCode::Char('l') => {
            app.scroll_view(0, 1);
            true
        }
        KeyCode::Enter => {
            app.set_focus(Focus::Detail);
            true
        }
        _ => false,
    }
}

/// Handle keys when the detail pane is focused.
fn handle_detail_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_view(1, 0);
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_view(-1, 0);
            true
        }
        KeyCode::Char('h') => {
            app.scroll_view(0, -1);
            true
        }
        KeyCode::Char('l') => {
            app.scroll_view(0, 1);
            true
        }
        KeyCode::Char('}') => {
            app.next_change();
            true
        }
        KeyCode::Char('{') => {
            app.prev_change();
            true
        }
        KeyCode::PageDown => {
            app.scroll_view(PAGE_ROWS, 0);
            true
        }
        KeyCode::PageUp => {
            app.scroll_view(-PAGE_ROWS, 0);
            true
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.scroll_to_bottom();
            true
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.scroll_to_top();
            true
        }
        _ => false,
    }
}

/// Handle keys while the help overlay is open.
fn handle_help_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            app.toggle_help();
            true
        }
        _ => false,
    }
}

/// Handle keys in the jump-to-file prompt.
fn handle_prompt_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.cancel_prompt();
            true
        }
        KeyCode::Enter => {
            app.submit_prompt();
            true
        }
        KeyCode::Tab => {
            app.prompt_complete();
            true
        }
        KeyCode::Up => {
            app.prompt_move(-1);
            true
        }
        KeyCode::Down => {
            app.prompt_move(1);
            true
        }
        KeyCode::Backspace => {
            app.prompt_backspace();
            true
        }
        KeyCode::Char(c) => {
            app.prompt_push(c);
            true
        }
        _ => false,
    }
}
