//! Key bindings for the typing field and screens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press. Screens decide what each action means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A printable character (space included).
    Type(char),
    Backspace,
    /// Enter: send combo while playing, start on the intro screen.
    Confirm,
    Quit,
    None,
}

pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c' | 'q') => Action::Quit,
            _ => Action::None,
        };
    }
    if modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER) {
        return Action::None;
    }
    match code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) if !c.is_control() => Action::Type(c),
        _ => Action::None,
    }
}
