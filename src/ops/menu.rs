use crate::model::{Due, Priority, Task, TaskCollection};

/// Text of the single entry shown when there is nothing left in the list
pub const EMPTY_MESSAGE: &str = "No tasks left to complete!";

/// One row of the task menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Describes the task at the same position in the collection
    Task {
        label: String,
        /// Back-reference used to check alignment on resolve
        task_id: String,
        priority: Priority,
        due: Option<Due>,
    },
    /// Informational, never selectable
    Info(&'static str),
}

impl MenuEntry {
    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Task { label, .. } => label,
            MenuEntry::Info(text) => text,
        }
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self, MenuEntry::Task { .. })
    }
}

/// Error type for resolving a menu selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("selection {position} is outside the {len} listed tasks")]
    OutOfRange { position: usize, len: usize },
    #[error("menu row {position} is stale: it no longer shows task {task_id}")]
    Misaligned { position: usize, task_id: String },
}

/// Display rows derived from a [`TaskCollection`], index-parallel to it.
///
/// Never edited in place: every change to the collection is followed by a
/// fresh [`MenuProjection::project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuProjection {
    entries: Vec<MenuEntry>,
}

impl MenuProjection {
    pub fn project(collection: &TaskCollection) -> Self {
        if collection.is_empty() {
            return MenuProjection {
                entries: vec![MenuEntry::Info(EMPTY_MESSAGE)],
            };
        }
        let entries = collection
            .iter()
            .map(|task| MenuEntry::Task {
                label: task.content.clone(),
                task_id: task.id.clone(),
                priority: task.priority,
                due: task.due.clone(),
            })
            .collect();
        MenuProjection { entries }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Rows to draw, including the informational row when empty
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the only row is the "nothing left" message
    pub fn is_placeholder(&self) -> bool {
        !self.entries.iter().any(MenuEntry::is_selectable)
    }

    /// Rows a cursor may rest on. Always equals the collection length.
    pub fn selectable_len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_selectable()).count()
    }

    /// Map a cursor position back to its task.
    ///
    /// `Ok(None)` means "no selection" (the informational row); callers treat
    /// it as a no-op.
    pub fn resolve<'a>(
        &self,
        position: usize,
        collection: &'a TaskCollection,
    ) -> Result<Option<&'a Task>, IndexError> {
        if self.is_placeholder() {
            return Ok(None);
        }
        let entry = self.entries.get(position);
        let task = collection.get(position);
        match (entry, task) {
            (Some(MenuEntry::Task { task_id, .. }), Some(task)) if *task_id == task.id => {
                Ok(Some(task))
            }
            (Some(MenuEntry::Task { task_id, .. }), Some(_)) => Err(IndexError::Misaligned {
                position,
                task_id: task_id.clone(),
            }),
            _ => Err(IndexError::OutOfRange {
                position,
                len: collection.len().min(self.entries.len()),
            }),
        }
    }
}
