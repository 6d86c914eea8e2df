use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Project, Task};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub scope: &'a str,
    pub tasks: &'a [Task],
}

#[derive(Serialize)]
pub struct ChangeJson<'a> {
    pub id: &'a str,
    pub action: &'a str,
}

#[derive(Serialize)]
pub struct AddedJson<'a> {
    pub id: &'a str,
    pub content: &'a str,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `<id>  <name>`, with the Inbox marked
pub fn format_project_line(project: &Project) -> String {
    if project.is_inbox {
        format!("{}  {} (inbox)", project.id, project.name)
    } else {
        format!("{}  {}", project.id, project.name)
    }
}

/// `[P1] <id>  <content>  (due)`; overdue dates are flagged
pub fn format_task_line(task: &Task, today: NaiveDate) -> String {
    let mut line = format!("[{}] {}  {}", task.priority.label(), task.id, task.content);
    if let Some(due) = &task.due {
        let when = if due.string.trim().is_empty() {
            due.date.to_string()
        } else {
            due.string.clone()
        };
        if due.is_overdue(today) {
            line.push_str(&format!("  ({}, overdue)", when));
        } else {
            line.push_str(&format!("  ({})", when));
        }
    }
    line
}

pub fn format_task_list(tasks: &[Task], today: NaiveDate) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["No tasks left to complete!".to_string()];
    }
    tasks.iter().map(|t| format_task_line(t, today)).collect()
}
