use crossterm::event::KeyEvent;

use crate::tui::app::{App, ConfirmState, Mode, PendingAction, View};

use super::{Action, Direction, action_for_key};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay swallows everything except the keys that close it
    if app.show_help {
        if matches!(
            action_for_key(key),
            Some(Action::Help | Action::Back | Action::Quit)
        ) {
            app.show_help = false;
        }
        return;
    }

    let Some(action) = action_for_key(key) else {
        return;
    };

    // Clear any transient status message on keypress
    app.clear_status();

    match action {
        Action::Navigate(direction) => move_cursor(app, direction),
        Action::Open => {
            if app.view == View::Projects && !app.scopes.is_empty() {
                app.queue(PendingAction::OpenScope(app.projects_cursor));
            }
        }
        Action::Back => match app.view {
            View::Tasks => app.close_session(),
            View::Projects => app.last_search = None,
        },
        Action::Quit => match app.view {
            View::Tasks => app.close_session(),
            View::Projects => app.should_quit = true,
        },
        Action::Complete => queue_on_task(app, PendingAction::Complete),
        Action::Reopen => queue_on_task(app, PendingAction::Reopen),
        Action::Create => {
            if app.view == View::Tasks {
                app.prompt.clear();
                app.mode = Mode::Prompt;
            }
        }
        Action::Delete => begin_delete(app),
        Action::Sort => {
            if let Some(session) = app.session.as_mut() {
                let result = session.sort_by_priority();
                app.report(result);
            }
        }
        Action::Reload => match app.view {
            View::Tasks => app.queue(PendingAction::Reload),
            View::Projects => app.queue(PendingAction::ReloadProjects),
        },
        Action::Search => {
            app.search_input.clear();
            app.mode = Mode::Search;
        }
        Action::NextMatch => jump_to_match(app, true, false),
        Action::PrevMatch => jump_to_match(app, false, false),
        Action::Help => app.show_help = true,
    }
}

fn move_cursor(app: &mut App, direction: Direction) {
    let cursor = app.cursor();
    let target = match direction {
        Direction::Up => cursor.saturating_sub(1),
        Direction::Down => cursor + 1,
        Direction::Top => 0,
        Direction::Bottom => usize::MAX,
    };
    app.set_cursor(target);
}

/// Queue a per-task command for the cursor row. The informational row of an
/// empty list is not a task, so nothing is sent.
fn queue_on_task(app: &mut App, make: fn(usize) -> PendingAction) {
    if app.view != View::Tasks {
        return;
    }
    let Some(session) = app.session.as_ref() else {
        return;
    };
    if session.menu().is_placeholder() {
        return;
    }
    app.queue(make(app.tasks_cursor));
}

fn begin_delete(app: &mut App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    match session.resolve(app.tasks_cursor) {
        Ok(Some(task)) => {
            app.confirm_state = Some(ConfirmState {
                task_id: task.id.clone(),
                content: task.content.clone(),
            });
            app.mode = Mode::Confirm;
        }
        Ok(None) => {}
        Err(e) => app.set_error(e.to_string()),
    }
}

/// Move the cursor to the next (or previous) row matching the last search,
/// wrapping around. `inclusive` also accepts the cursor row itself.
pub(super) fn jump_to_match(app: &mut App, forward: bool, inclusive: bool) {
    let Some(re) = app.active_search_re() else {
        return;
    };
    let labels = app.row_labels();
    let len = labels.len();
    if len == 0 {
        return;
    }
    let cursor = app.cursor();
    let start = if inclusive { 0 } else { 1 };
    let found = (start..len + start).find_map(|step| {
        let i = if forward {
            (cursor + step) % len
        } else {
            (cursor + len - step % len) % len
        };
        re.is_match(labels[i]).then_some(i)
    });
    match found {
        Some(i) => app.set_cursor(i),
        None => {
            let pattern = app.last_search.clone().unwrap_or_default();
            app.set_error(format!("no match for /{}", pattern));
        }
    }
}
