use std::collections::HashSet;

use serde_json::Value;

use super::schema::{SchemaError, as_list};
use super::task::{Priority, Task};

/// Error type for collection edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("position {position} is out of range for {len} tasks")]
    OutOfRange { position: usize, len: usize },
    #[error("task {0} is already listed")]
    DuplicateId(String),
}

/// The open tasks of one project (or of the "Today" view), in display order.
///
/// Order is whatever the server returned until [`TaskCollection::sorted_by_priority`]
/// is applied. Ids are unique within a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from already-validated tasks.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, CollectionError> {
        let mut collection = TaskCollection::new();
        for task in tasks {
            collection.push(task)?;
        }
        Ok(collection)
    }

    /// Convert a decoded task list. Fails on the first record that does not
    /// have a textual `id` and `content` and a priority in 1..=4.
    pub fn load(raw: &Value) -> Result<Self, SchemaError> {
        let records = as_list(raw, "tasks")?;
        let mut seen = HashSet::with_capacity(records.len());
        let mut tasks = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let task = Task::from_value(index, record)?;
            if !seen.insert(task.id.clone()) {
                return Err(SchemaError::DuplicateId {
                    kind: "task",
                    index,
                    id: task.id,
                });
            }
            tasks.push(task);
        }
        Ok(TaskCollection { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Task> {
        self.tasks.get(position)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Reorder by priority, most urgent first.
    ///
    /// Walks the four levels from 4 down to 1 and appends the matching tasks in
    /// their current order, so ties keep their relative position.
    pub fn sorted_by_priority(&self) -> TaskCollection {
        let mut ordered = Vec::with_capacity(self.tasks.len());
        for level in Priority::descending() {
            ordered.extend(self.tasks.iter().filter(|t| t.priority == level).cloned());
        }
        TaskCollection { tasks: ordered }
    }

    pub fn index_of(&self, id: &str) -> Result<usize, CollectionError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Insert before `position` (`position == len` appends). Returns the new length.
    pub fn insert_at(&mut self, position: usize, task: Task) -> Result<usize, CollectionError> {
        if position > self.tasks.len() {
            return Err(CollectionError::OutOfRange {
                position,
                len: self.tasks.len(),
            });
        }
        if self.find(&task.id).is_some() {
            return Err(CollectionError::DuplicateId(task.id));
        }
        self.tasks.insert(position, task);
        Ok(self.tasks.len())
    }

    /// Append a task. Returns the new length.
    pub fn push(&mut self, task: Task) -> Result<usize, CollectionError> {
        self.insert_at(self.tasks.len(), task)
    }

    /// Remove the task at `position`. Returns the new length, which may be 0.
    pub fn remove_at(&mut self, position: usize) -> Result<usize, CollectionError> {
        if position >= self.tasks.len() {
            return Err(CollectionError::OutOfRange {
                position,
                len: self.tasks.len(),
            });
        }
        self.tasks.remove(position);
        Ok(self.tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn task(id: &str, priority: u8) -> Task {
        Task::new(id, format!("task {id}"), Priority::new(priority).unwrap())
    }

    fn sample() -> TaskCollection {
        TaskCollection::from_tasks(vec![task("a", 2), task("b", 4), task("c", 2), task("d", 4)])
            .unwrap()
    }

    #[test]
    fn test_sort_by_priority_is_stable_bucket_order() {
        let sorted = sample().sorted_by_priority();
        assert_eq!(sorted.ids(), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_by_priority_covers_all_levels() {
        let collection = TaskCollection::from_tasks(vec![
            task("low", 1),
            task("urgent", 4),
            task("mid", 2),
            task("high", 3),
            task("low2", 1),
        ])
        .unwrap();
        assert_eq!(
            collection.sorted_by_priority().ids(),
            vec!["urgent", "high", "mid", "low", "low2"]
        );
        // Original is untouched
        assert_eq!(collection.ids()[0], "low");
    }

    #[test]
    fn test_load_preserves_server_order() {
        let raw = json!([
            { "id": "2", "content": "second", "priority": 1 },
            { "id": "1", "content": "first", "priority": 4 }
        ]);
        let collection = TaskCollection::load(&raw).unwrap();
        assert_eq!(collection.ids(), vec!["2", "1"]);
    }

    #[test]
    fn test_load_rejects_non_array() {
        assert_eq!(
            TaskCollection::load(&json!({ "error": "nope" })),
            Err(SchemaError::NotAList("tasks"))
        );
    }

    #[test]
    fn test_load_names_bad_record() {
        let raw = json!([
            { "id": "1", "content": "ok", "priority": 1 },
            { "id": "2", "priority": 1 }
        ]);
        assert_eq!(
            TaskCollection::load(&raw),
            Err(SchemaError::MissingField {
                kind: "task",
                index: 1,
                field: "content",
            })
        );
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let raw = json!([
            { "id": "1", "content": "a", "priority": 1 },
            { "id": "1", "content": "b", "priority": 1 }
        ]);
        assert!(matches!(
            TaskCollection::load(&raw),
            Err(SchemaError::DuplicateId { index: 1, .. })
        ));
    }

    #[test]
    fn test_index_of() {
        let collection = sample();
        assert_eq!(collection.index_of("c"), Ok(2));
        assert_eq!(
            collection.index_of("zzz"),
            Err(CollectionError::NotFound("zzz".into()))
        );
    }

    #[test]
    fn test_insert_at_returns_new_length() {
        let mut collection = sample();
        assert_eq!(collection.insert_at(0, task("new", 1)), Ok(5));
        assert_eq!(collection.ids()[0], "new");
        assert_eq!(collection.insert_at(5, task("end", 1)), Ok(6));
        assert_eq!(collection.ids()[5], "end");
    }

    #[test]
    fn test_insert_at_rejects_out_of_range_and_duplicates() {
        let mut collection = sample();
        assert_eq!(
            collection.insert_at(9, task("x", 1)),
            Err(CollectionError::OutOfRange { position: 9, len: 4 })
        );
        assert_eq!(
            collection.push(task("a", 1)),
            Err(CollectionError::DuplicateId("a".into()))
        );
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_remove_last_task_leaves_empty_collection() {
        let mut collection = TaskCollection::from_tasks(vec![task("only", 1)]).unwrap();
        assert_eq!(collection.remove_at(0), Ok(0));
        assert!(collection.is_empty());
        assert_eq!(collection.get(0), None);
        assert_eq!(
            collection.remove_at(0),
            Err(CollectionError::OutOfRange { position: 0, len: 0 })
        );
    }
}
