//! Keyboard input handling for the TUI.
//!
//! Translates key events into calls on `App`. Overlays take every key while
//! they are open.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppMode, Field, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.mode {
        AppMode::ShowingAlert => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                app.dismiss_alert();
            }
            Ok(false)
        }
        AppMode::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.mode = AppMode::Normal;
            }
            Ok(false)
        }
        AppMode::ConfirmingQuit => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.mode = AppMode::Quitting;
                Ok(true)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.mode = AppMode::Normal;
                Ok(false)
            }
            _ => Ok(false),
        },
        AppMode::Editing(field) => {
            handle_editing_input(app, field, key);
            Ok(false)
        }
        AppMode::Quitting => Ok(true),
        AppMode::Normal => handle_normal_input(app, key),
    }
}

fn handle_editing_input(app: &mut App, field: Field, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => app.push_char(field, c),
        KeyCode::Backspace => app.pop_char(field),
        KeyCode::Tab | KeyCode::BackTab => {
            app.input_error = None;
            app.mode = AppMode::Editing(field.next());
        }
        KeyCode::Enter => match field {
            Field::Zip => app.submit_zip(),
            Field::Distance => app.submit_distance(),
        },
        KeyCode::Esc => app.cancel_editing(),
        _ => {}
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => app.mode = AppMode::ConfirmingQuit,
        KeyCode::Char('?') => app.mode = AppMode::ShowingHelp,

        // Search form
        KeyCode::Char('z') | KeyCode::Char('/') => app.start_editing(Field::Zip),
        KeyCode::Char('d') => app.start_editing(Field::Distance),
        KeyCode::Char('u') => app.refresh(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        _ => {}
    }
    Ok(false)
}
