use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::remote::testing::FakeTransport;
use crate::model::{Priority, Project, Scope, Task, TaskCollection};
use crate::ops::reconcile::{Session, SessionOptions};
use crate::tui::app::{App, View};

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// App on the project picker, with projects named `names` (ids p1, p2, ...).
pub fn app_with_projects(fake: &FakeTransport, names: &[&str]) -> App {
    let projects: Vec<Project> = names
        .iter()
        .enumerate()
        .map(|(i, name)| Project::new(format!("p{}", i + 1), *name))
        .collect();
    let mut app = App::new(fake.client(), SessionOptions::default(), &projects);
    app.today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    app
}

/// App in the Tasks view of "Today", holding `(id, content, priority)` tasks.
pub fn app_with_tasks(fake: &FakeTransport, tasks: &[(&str, &str, u8)]) -> App {
    let mut app = app_with_projects(fake, &["Home"]);
    let tasks = tasks
        .iter()
        .map(|(id, content, level)| Task::new(*id, *content, Priority::new(*level).unwrap()))
        .collect();
    set_tasks(&mut app, tasks);
    app.view = View::Tasks;
    app
}

/// Replace the open session with one holding `tasks`.
pub fn set_tasks(app: &mut App, tasks: Vec<Task>) {
    let collection = TaskCollection::from_tasks(tasks).unwrap();
    app.session = Some(Session::from_collection(
        Scope::Today,
        collection,
        app.options,
    ));
}
