use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

use super::navigate::jump_to_match;

pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Cancel search
        (_, KeyCode::Esc) => {
            app.mode = Mode::Navigate;
            app.search_input.clear();
        }

        // Execute search
        (_, KeyCode::Enter) => {
            app.mode = Mode::Navigate;
            if !app.search_input.is_empty() {
                app.last_search = Some(std::mem::take(&mut app.search_input));
                jump_to_match(app, true, true);
            }
        }

        (_, KeyCode::Backspace) => {
            app.search_input.pop();
        }

        // Type character
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            app.search_input.push(c);
        }

        _ => {}
    }
}
