use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::model::Scope;

/// Due string the service treats as "done for today" on a daily task
pub const CLOSE_DUE_STRING: &str = "every day starting tomorrow";
/// Due string that makes a task due again today
pub const REOPEN_DUE_STRING: &str = "every day starting today";

/// Sync command types we issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    ItemAdd,
    ItemUpdate,
}

impl CommandType {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandType::ItemAdd => "item_add",
            CommandType::ItemUpdate => "item_update",
        }
    }
}

/// A fresh random token in canonical hyphenated form.
pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// One queued mutation for the Sync surface.
///
/// Built right before a request and dropped when the call returns; the
/// `uuid` lets the server discard an accidental re-send.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncCommand {
    pub kind: CommandType,
    pub uuid: String,
    /// Client-side placeholder id, only set on `item_add`
    pub temp_id: Option<String>,
    pub args: Value,
}

impl SyncCommand {
    fn new(kind: CommandType, args: Value) -> Self {
        SyncCommand {
            kind,
            uuid: new_token(),
            temp_id: None,
            args,
        }
    }

    /// Create a task in `scope`. The server answers with a mapping from
    /// `temp_id` to the real id.
    pub fn add_item(content: &str, scope: &Scope, temp_id: &str) -> Self {
        let mut args = Map::new();
        args.insert("content".into(), Value::from(content));
        match scope {
            Scope::Project { id, .. } => {
                args.insert("project_id".into(), Value::from(id.as_str()));
            }
            Scope::Today => {
                args.insert("due".into(), json!({ "string": "today" }));
            }
        }
        SyncCommand {
            temp_id: Some(temp_id.to_string()),
            ..SyncCommand::new(CommandType::ItemAdd, Value::Object(args))
        }
    }

    /// Replace a task's due date with a natural-language expression.
    pub fn set_due(task_id: &str, due_string: &str) -> Self {
        SyncCommand::new(
            CommandType::ItemUpdate,
            json!({ "id": task_id, "due": { "string": due_string } }),
        )
    }

    pub fn postpone(task_id: &str) -> Self {
        SyncCommand::set_due(task_id, CLOSE_DUE_STRING)
    }

    pub fn reopen(task_id: &str) -> Self {
        SyncCommand::set_due(task_id, REOPEN_DUE_STRING)
    }

    pub fn to_json(&self) -> Value {
        let mut command = Map::new();
        command.insert("type".into(), Value::from(self.kind.as_str()));
        command.insert("uuid".into(), Value::from(self.uuid.as_str()));
        if let Some(temp_id) = &self.temp_id {
            command.insert("temp_id".into(), Value::from(temp_id.as_str()));
        }
        command.insert("args".into(), self.args.clone());
        Value::Object(command)
    }
}

/// The `commands` form field: a JSON array of every command in the batch
pub fn encode_commands(commands: &[SyncCommand]) -> String {
    Value::Array(commands.iter().map(SyncCommand::to_json).collect()).to_string()
}

/// Decoded reply from the Sync surface
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResponse {
    body: Value,
}

impl SyncResponse {
    pub fn new(body: Value) -> Self {
        SyncResponse { body }
    }

    /// Error text for a command the server did not accept. A missing status
    /// entry counts as accepted.
    pub fn rejection(&self, uuid: &str) -> Option<String> {
        let status = self.body.get("sync_status")?.get(uuid)?;
        if status.as_str() == Some("ok") {
            return None;
        }
        let reason = status
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        Some(reason)
    }

    /// The real id assigned to the task created under `temp_id`
    pub fn real_id(&self, temp_id: &str) -> Option<String> {
        match self.body.get("temp_id_mapping")?.get(temp_id)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}
