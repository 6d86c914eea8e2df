//! Keeps a project's task list in step with the service.
//!
//! Every mutation follows the same path: resolve the target, send the remote
//! request, and only when it succeeds apply the matching local edit and
//! rebuild the menu. A failed request leaves the list exactly as it was.

use tracing::{debug, info, warn};

use crate::io::remote::{RemoteClient, RemoteError};
use crate::io::sync::{SyncCommand, new_token};
use crate::model::{
    ClientConfig, CollectionError, CompleteVia, Priority, SchemaError, Scope, Task,
    TaskCollection,
};
use crate::ops::menu::{IndexError, MenuProjection};

/// Where the engine is in handling a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    AwaitingRemote,
    Applying,
}

/// Result of a command that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Remote and local state both changed (or were refreshed)
    Applied { summary: String },
    /// The cursor was on the informational row; nothing was sent
    NoSelection,
    /// Create was asked for with blank text; nothing was sent
    EmptyInput,
}

/// Error type for session commands. Local state is untouched whenever one of
/// these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("unexpected response: {0}")]
    Schema(#[from] SchemaError),
    #[error("create response has no id for temporary token {0}")]
    Mapping(String),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("another command is still in progress")]
    Busy,
}

/// Per-session behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub complete_via: CompleteVia,
    pub sort_on_open: bool,
}

impl From<&ClientConfig> for SessionOptions {
    fn from(config: &ClientConfig) -> Self {
        SessionOptions {
            complete_via: config.complete_via,
            sort_on_open: config.sort_on_open,
        }
    }
}

/// One open task list: the collection, its menu, and the engine state.
///
/// Only the methods here write the collection or the menu.
#[derive(Debug, Clone)]
pub struct Session {
    scope: Scope,
    collection: TaskCollection,
    menu: MenuProjection,
    state: EngineState,
    options: SessionOptions,
    sorted: bool,
}

impl Session {
    /// Fetch every open task in `scope` and build the initial menu.
    pub fn open(
        client: &RemoteClient,
        scope: Scope,
        options: SessionOptions,
    ) -> Result<Session, ReconcileError> {
        let raw = client.get_tasks(&scope)?;
        let collection = TaskCollection::load(&raw)?;
        info!(scope = scope.title(), tasks = collection.len(), "opened task list");
        Ok(Session::from_collection(scope, collection, options))
    }

    pub fn from_collection(
        scope: Scope,
        collection: TaskCollection,
        options: SessionOptions,
    ) -> Session {
        let collection = if options.sort_on_open {
            collection.sorted_by_priority()
        } else {
            collection
        };
        let menu = MenuProjection::project(&collection);
        Session {
            scope,
            collection,
            menu,
            state: EngineState::Idle,
            options,
            sorted: options.sort_on_open,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    pub fn menu(&self) -> &MenuProjection {
        &self.menu
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// The task under a cursor position, `None` on the informational row
    pub fn resolve(&self, position: usize) -> Result<Option<&Task>, IndexError> {
        self.menu.resolve(position, &self.collection)
    }

    /// Reorder by priority (most urgent first) and rebuild the menu.
    pub fn sort_by_priority(&mut self) -> Result<Outcome, ReconcileError> {
        self.ensure_idle()?;
        self.collection = self.collection.sorted_by_priority();
        self.sorted = true;
        self.rebuild();
        Ok(Outcome::Applied {
            summary: "sorted by priority".to_string(),
        })
    }

    /// Complete the task under `position` and drop it from the list.
    pub fn complete(
        &mut self,
        client: &RemoteClient,
        position: usize,
    ) -> Result<Outcome, ReconcileError> {
        self.ensure_idle()?;
        let Some((task_id, content)) = self.target(position)? else {
            return Ok(Outcome::NoSelection);
        };

        let via = self.options.complete_via;
        self.round_trip(|| match via {
            CompleteVia::Rest => client.close_task(&task_id),
            CompleteVia::Sync => client.sync(&[SyncCommand::postpone(&task_id)]).map(|_| ()),
        })?;

        self.apply(|tasks| {
            let position = tasks.index_of(&task_id)?;
            tasks.remove_at(position).map(|_| ())
        })?;
        Ok(Outcome::Applied {
            summary: format!("completed \"{}\"", content),
        })
    }

    /// Make the task under `position` due again today.
    ///
    /// The list is left as it is: the task is already open, and the server
    /// only moves its due date.
    pub fn reopen(
        &mut self,
        client: &RemoteClient,
        position: usize,
    ) -> Result<Outcome, ReconcileError> {
        self.ensure_idle()?;
        let Some((task_id, content)) = self.target(position)? else {
            return Ok(Outcome::NoSelection);
        };

        self.round_trip(|| {
            client
                .sync(&[SyncCommand::reopen(&task_id)])
                .map(|_| ())
        })?;

        self.apply(|_| Ok(()))?;
        Ok(Outcome::Applied {
            summary: format!("reopened \"{}\"", content),
        })
    }

    /// Create a task in this session's scope and append it.
    pub fn create(
        &mut self,
        client: &RemoteClient,
        content: &str,
    ) -> Result<Outcome, ReconcileError> {
        self.ensure_idle()?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(Outcome::EmptyInput);
        }

        let temp_id = new_token();
        let command = SyncCommand::add_item(content, &self.scope, &temp_id);
        let real_id = self.round_trip(|| {
            let response = client.sync(std::slice::from_ref(&command))?;
            response
                .real_id(&temp_id)
                .ok_or_else(|| ReconcileError::Mapping(temp_id.clone()))
        })?;

        let mut task = Task::new(real_id, content, Priority::LOWEST);
        task.project_id = self.scope.project_id().map(str::to_string);
        self.apply(move |tasks| tasks.push(task).map(|_| ()))?;
        Ok(Outcome::Applied {
            summary: format!("added \"{}\"", content),
        })
    }

    /// Delete the task with `task_id`.
    ///
    /// Takes the id rather than a cursor position so that a confirmation
    /// prompt cannot end up deleting whatever moved into that row.
    pub fn delete(
        &mut self,
        client: &RemoteClient,
        task_id: &str,
    ) -> Result<Outcome, ReconcileError> {
        self.ensure_idle()?;
        let content = self
            .collection
            .find(task_id)
            .map(|t| t.content.clone())
            .ok_or_else(|| CollectionError::NotFound(task_id.to_string()))?;

        self.round_trip(|| client.delete_task(task_id))?;

        self.apply(|tasks| {
            let position = tasks.index_of(task_id)?;
            tasks.remove_at(position).map(|_| ())
        })?;
        Ok(Outcome::Applied {
            summary: format!("deleted \"{}\"", content),
        })
    }

    /// Refetch the whole list, keeping the current sort mode.
    pub fn reload(&mut self, client: &RemoteClient) -> Result<Outcome, ReconcileError> {
        self.ensure_idle()?;
        let scope = self.scope.clone();
        let fresh = self.round_trip(|| {
            let raw = client.get_tasks(&scope)?;
            Ok::<_, ReconcileError>(TaskCollection::load(&raw)?)
        })?;

        let fresh = if self.sorted {
            fresh.sorted_by_priority()
        } else {
            fresh
        };
        let count = fresh.len();
        self.apply(move |tasks| {
            *tasks = fresh;
            Ok(())
        })?;
        Ok(Outcome::Applied {
            summary: format!("{} open tasks", count),
        })
    }

    fn ensure_idle(&self) -> Result<(), ReconcileError> {
        if self.state == EngineState::Idle {
            Ok(())
        } else {
            Err(ReconcileError::Busy)
        }
    }

    fn target(&self, position: usize) -> Result<Option<(String, String)>, IndexError> {
        Ok(self
            .resolve(position)?
            .map(|task| (task.id.clone(), task.content.clone())))
    }

    fn transition(&mut self, next: EngineState) {
        debug!(from = ?self.state, to = ?next, "engine state");
        self.state = next;
    }

    /// Run the remote half of a command. On failure the engine goes straight
    /// back to idle without touching the list.
    fn round_trip<R, E>(&mut self, send: impl FnOnce() -> Result<R, E>) -> Result<R, ReconcileError>
    where
        E: Into<ReconcileError>,
    {
        self.transition(EngineState::AwaitingRemote);
        match send() {
            Ok(value) => {
                self.transition(EngineState::Applying);
                Ok(value)
            }
            Err(e) => {
                let e = e.into();
                warn!(scope = self.scope.title(), error = %e, "remote command failed");
                self.transition(EngineState::Idle);
                Err(e)
            }
        }
    }

    /// Apply the local half of a command to a copy of the list, then swap it
    /// in and rebuild the menu. If the edit fails the old list stays.
    fn apply(
        &mut self,
        edit: impl FnOnce(&mut TaskCollection) -> Result<(), CollectionError>,
    ) -> Result<(), ReconcileError> {
        let mut next = self.collection.clone();
        let result = edit(&mut next);
        match &result {
            Ok(()) => self.collection = next,
            Err(e) => warn!(error = %e, "local edit failed after remote success"),
        }
        self.rebuild();
        self.transition(EngineState::Idle);
        result.map_err(ReconcileError::from)
    }

    fn rebuild(&mut self) {
        self.menu = MenuProjection::project(&self.collection);
        debug_assert_eq!(self.menu.selectable_len(), self.collection.len());
    }
}
