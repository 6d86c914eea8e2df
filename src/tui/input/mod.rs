mod confirm;
mod navigate;
mod prompt;
mod search;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use confirm::handle_confirm;
use navigate::handle_navigate;
use prompt::handle_prompt;
use search::handle_search;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

/// Everything a key can ask for in Navigate mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Navigate(Direction),
    Open,
    Back,
    Quit,
    Complete,
    Reopen,
    Create,
    Delete,
    Sort,
    Reload,
    Search,
    NextMatch,
    PrevMatch,
    Help,
}

/// Map a key to its Navigate-mode action. Keys with no binding map to `None`.
pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Navigate(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Navigate(Direction::Down),
        KeyCode::Home | KeyCode::Char('g') => Action::Navigate(Direction::Top),
        KeyCode::End | KeyCode::Char('G') => Action::Navigate(Direction::Bottom),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Action::Open,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => Action::Back,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('p') => Action::Complete,
        KeyCode::Char('o') => Action::Reopen,
        KeyCode::Char('i') => Action::Create,
        KeyCode::Char('d') => Action::Delete,
        KeyCode::Char('s') => Action::Sort,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('/') => Action::Search,
        KeyCode::Char('n') => Action::NextMatch,
        KeyCode::Char('N') => Action::PrevMatch,
        KeyCode::Char('?') => Action::Help,
        _ => return None,
    };
    Some(action)
}

/// Normalize key events from terminals using the kitty keyboard protocol,
/// which send `Char(lowercase) + SHIFT` instead of `Char(UPPERCASE)`.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        } else if c == '/' {
            key.code = KeyCode::Char('?');
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    key
}

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    // A queued network command has not run yet
    if app.pending.is_some() {
        return;
    }

    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Prompt => handle_prompt(app, key),
        Mode::Confirm => handle_confirm(app, key),
        Mode::Search => handle_search(app, key),
    }
}


#[cfg(test)]
mod tests {
    use super::test_keys::key;
    use super::*;

    #[test]
    fn test_action_for_key_bindings() {
        let cases = [
            (KeyCode::Char('j'), Action::Navigate(Direction::Down)),
            (KeyCode::Up, Action::Navigate(Direction::Up)),
            (KeyCode::Char('G'), Action::Navigate(Direction::Bottom)),
            (KeyCode::Enter, Action::Open),
            (KeyCode::Char('l'), Action::Open),
            (KeyCode::Backspace, Action::Back),
            (KeyCode::Char('h'), Action::Back),
            (KeyCode::Char('p'), Action::Complete),
            (KeyCode::Char('o'), Action::Reopen),
            (KeyCode::Char('i'), Action::Create),
            (KeyCode::Char('d'), Action::Delete),
            (KeyCode::Char('q'), Action::Quit),
        ];
        for (code, action) in cases {
            assert_eq!(action_for_key(key(code)), Some(action), "{code:?}");
        }
        assert_eq!(action_for_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            action_for_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_normalize_kitty_shift() {
        let shifted = normalize_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::SHIFT));
        assert_eq!(
            action_for_key(shifted),
            Some(Action::Navigate(Direction::Bottom))
        );
        let help = normalize_key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::SHIFT));
        assert_eq!(action_for_key(help), Some(Action::Help));
    }
}
