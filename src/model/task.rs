use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::schema::{Record, SchemaError};

/// Task priority as the service stores it: 1 is normal, 4 is most urgent.
///
/// Users see the levels inverted, so level 4 is labelled "P1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    pub const LOWEST: Priority = Priority(1);
    pub const HIGHEST: Priority = Priority(4);

    /// Build a priority from its raw level, rejecting anything outside 1..=4
    pub fn new(level: u8) -> Option<Priority> {
        (1..=4).contains(&level).then_some(Priority(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// The label shown in the service UI ("P1" is the most urgent)
    pub fn label(self) -> &'static str {
        match self.0 {
            4 => "P1",
            3 => "P2",
            2 => "P3",
            _ => "P4",
        }
    }

    /// Every level, most urgent first
    pub fn descending() -> impl Iterator<Item = Priority> {
        (1..=4).rev().map(Priority)
    }
}

/// Due date attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Due {
    pub date: NaiveDate,
    /// Natural-language form, e.g. "every day starting tomorrow"
    pub string: String,
    pub is_recurring: bool,
}

impl Due {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.date < today
    }

    /// Parse the `due` object of a task record. Datetimes keep only their date.
    fn from_value(value: &Value) -> Option<Due> {
        let date_text = value.get("date")?.as_str()?;
        let date = NaiveDate::parse_from_str(date_text.get(..10)?, "%Y-%m-%d").ok()?;
        let string = value
            .get("string")
            .and_then(Value::as_str)
            .unwrap_or(date_text)
            .to_string();
        let is_recurring = value
            .get("is_recurring")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Some(Due {
            date,
            string,
            is_recurring,
        })
    }
}

/// One open task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Server-assigned identifier, never changes once created
    pub id: String,
    pub content: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<Due>,
}

impl Task {
    pub fn new(id: impl Into<String>, content: impl Into<String>, priority: Priority) -> Self {
        Task {
            id: id.into(),
            content: content.into(),
            priority,
            project_id: None,
            due: None,
        }
    }

    /// Convert one decoded task record. `index` is its position in the
    /// response and only used to name the record in errors.
    pub fn from_value(index: usize, value: &Value) -> Result<Task, SchemaError> {
        let record = Record::new("task", index, value)?;
        let id = record.required_str("id")?;
        let content = record.required_str("content")?;
        let raw_priority = record.required("priority")?;
        let priority = raw_priority
            .as_u64()
            .and_then(|level| u8::try_from(level).ok())
            .and_then(Priority::new)
            .ok_or_else(|| SchemaError::InvalidPriority {
                index: record.index(),
                value: raw_priority.to_string(),
            })?;

        let due = record.optional("due").and_then(|raw| {
            let due = Due::from_value(raw);
            if due.is_none() {
                tracing::debug!(task = %id, "ignoring unreadable due date");
            }
            due
        });

        Ok(Task {
            id,
            content,
            priority,
            project_id: record.optional_str("project_id"),
            due,
        })
    }
}
