use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode, PendingAction};

/// Editing the content of a new task
pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            app.prompt.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => {
            let content = app.prompt.take();
            app.mode = Mode::Navigate;
            if content.trim().is_empty() {
                app.set_status("nothing added");
            } else {
                app.queue(PendingAction::Create(content));
            }
        }
        KeyCode::Backspace => app.prompt.backspace(),
        KeyCode::Delete => app.prompt.delete(),
        KeyCode::Left => app.prompt.left(),
        KeyCode::Right => app.prompt.right(),
        KeyCode::Home => app.prompt.home(),
        KeyCode::End => app.prompt.end(),
        KeyCode::Char('a') if ctrl => app.prompt.home(),
        KeyCode::Char('e') if ctrl => app.prompt.end(),
        KeyCode::Char('w') if ctrl => app.prompt.delete_word(),
        KeyCode::Char('u') if ctrl => app.prompt.clear(),
        KeyCode::Char(c) if !ctrl => app.prompt.insert(c),
        _ => {}
    }
}
