use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::schema::{Record, SchemaError, as_list};

/// A named group of tasks on the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// The service's built-in Inbox project
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_inbox: bool,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Project {
            id: id.into(),
            name: name.into(),
            is_inbox: false,
        }
    }

    /// Convert a decoded project list, keeping server order.
    pub fn load_list(raw: &Value) -> Result<Vec<Project>, SchemaError> {
        let records = as_list(raw, "projects")?;
        let mut seen = HashSet::with_capacity(records.len());
        let mut projects = Vec::with_capacity(records.len());
        for (index, value) in records.iter().enumerate() {
            let record = Record::new("project", index, value)?;
            let project = Project {
                id: record.required_str("id")?,
                name: record.required_str("name")?,
                is_inbox: record.optional_bool("is_inbox_project"),
            };
            if !seen.insert(project.id.clone()) {
                return Err(record.duplicate(&project.id));
            }
            projects.push(project);
        }
        Ok(projects)
    }
}

/// What a task list is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Tasks due today across all projects
    Today,
    Project { id: String, name: String },
}

impl Scope {
    /// The list shown in the project picker: "Today" first, then every project.
    pub fn picker_entries(projects: &[Project]) -> Vec<Scope> {
        std::iter::once(Scope::Today)
            .chain(projects.iter().map(Scope::from))
            .collect()
    }

    pub fn title(&self) -> &str {
        match self {
            Scope::Today => "Today",
            Scope::Project { name, .. } => name,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            Scope::Today => None,
            Scope::Project { id, .. } => Some(id),
        }
    }

    /// Query parameter that selects this scope's tasks on the REST surface
    pub fn task_query(&self) -> (&'static str, &str) {
        match self {
            Scope::Today => ("filter", "today"),
            Scope::Project { id, .. } => ("project_id", id),
        }
    }
}

impl From<&Project> for Scope {
    fn from(project: &Project) -> Self {
        Scope::Project {
            id: project.id.clone(),
            name: project.name.clone(),
        }
    }
}
