use serde_json::Value;
use tracing::{debug, warn};

use super::sync::{SyncCommand, SyncResponse, encode_commands};
use crate::model::Scope;

/// Error type for a single exchange with the service
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("could not decode server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server rejected {command}: {reason}")]
    Rejected { command: String, reason: String },
    #[error("could not build request URL: {0}")]
    Url(String),
}

/// Which API a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Resource-oriented CRUD endpoints under the REST base URL
    Rest,
    /// The single command-queue endpoint
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// A request described structurally. The transport turns `segments` and
/// `query` into a URL with proper escaping; nothing is spliced as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub surface: Surface,
    pub method: Method,
    /// Path segments relative to the surface base
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    /// Form-encoded body fields; empty means no body
    pub form: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn rest(method: Method, segments: &[&str]) -> Self {
        ApiRequest {
            surface: Surface::Rest,
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn sync(commands: &[SyncCommand]) -> Self {
        ApiRequest {
            surface: Surface::Sync,
            method: Method::Post,
            segments: Vec::new(),
            query: Vec::new(),
            form: vec![("commands".to_string(), encode_commands(commands))],
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Short description for logs, e.g. `POST rest:tasks/12/close`
    pub fn describe(&self) -> String {
        let surface = match self.surface {
            Surface::Rest => "rest",
            Surface::Sync => "sync",
        };
        format!("{} {}:{}", self.method.as_str(), surface, self.segments.join("/"))
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        RawResponse {
            status: 200,
            body: body.into(),
        }
    }

    pub fn no_content() -> Self {
        RawResponse {
            status: 204,
            body: String::new(),
        }
    }
}

/// Performs one blocking request/response exchange.
pub trait Transport {
    fn perform(&self, request: &ApiRequest) -> Result<RawResponse, RemoteError>;
}

/// The session's handle to the service. Owns its transport and turns raw
/// responses into decoded values or typed failures. Nothing here retries.
pub struct RemoteClient {
    transport: Box<dyn Transport>,
}

impl RemoteClient {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        RemoteClient { transport }
    }

    /// Send `request` and decode the reply. HTTP 204 yields `Value::Null`.
    pub fn perform(&self, request: &ApiRequest) -> Result<Value, RemoteError> {
        debug!(request = %request.describe(), "sending");
        let raw = self.transport.perform(request).inspect_err(|e| {
            warn!(request = %request.describe(), error = %e, "request failed");
        })?;
        debug!(status = raw.status, bytes = raw.body.len(), "response");

        match raw.status {
            204 => Ok(Value::Null),
            200..=299 => serde_json::from_str(&raw.body).map_err(|e| {
                warn!(request = %request.describe(), error = %e, "undecodable response");
                RemoteError::Decode(e)
            }),
            status => Err(RemoteError::Status(status)),
        }
    }

    pub fn get_projects(&self) -> Result<Value, RemoteError> {
        self.perform(&ApiRequest::rest(Method::Get, &["projects"]))
    }

    pub fn get_tasks(&self, scope: &Scope) -> Result<Value, RemoteError> {
        let (key, value) = scope.task_query();
        self.perform(&ApiRequest::rest(Method::Get, &["tasks"]).with_query(key, value))
    }

    pub fn close_task(&self, task_id: &str) -> Result<(), RemoteError> {
        self.perform(&ApiRequest::rest(Method::Post, &["tasks", task_id, "close"]))
            .map(|_| ())
    }

    pub fn delete_task(&self, task_id: &str) -> Result<(), RemoteError> {
        self.perform(&ApiRequest::rest(Method::Delete, &["tasks", task_id]))
            .map(|_| ())
    }

    /// Send a batch of commands. Fails if the server rejects any of them.
    pub fn sync(&self, commands: &[SyncCommand]) -> Result<SyncResponse, RemoteError> {
        let response = SyncResponse::new(self.perform(&ApiRequest::sync(commands))?);
        for command in commands {
            if let Some(reason) = response.rejection(&command.uuid) {
                return Err(RemoteError::Rejected {
                    command: command.kind.as_str().to_string(),
                    reason,
                });
            }
        }
        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    /// Scripted transport: replies are consumed in order, requests are recorded.
    #[derive(Clone, Default)]
    pub struct FakeTransport {
        pub requests: Rc<RefCell<Vec<ApiRequest>>>,
        replies: Rc<RefCell<VecDeque<Result<RawResponse, RemoteError>>>>,
    }

    impl FakeTransport {
        pub fn reply(&self, reply: Result<RawResponse, RemoteError>) -> &Self {
            self.replies.borrow_mut().push_back(reply);
            self
        }

        pub fn reply_json(&self, body: Value) -> &Self {
            self.reply(Ok(RawResponse::ok(body.to_string())))
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn last_request(&self) -> Option<ApiRequest> {
            self.requests.borrow().last().cloned()
        }

        pub fn client(&self) -> RemoteClient {
            RemoteClient::new(Box::new(self.clone()))
        }
    }

    impl Transport for FakeTransport {
        fn perform(&self, request: &ApiRequest) -> Result<RawResponse, RemoteError> {
            self.requests.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(RemoteError::Transport("no scripted reply".into())))
        }
    }

    /// Answers every Sync batch by mapping the first command's `temp_id` to
    /// the given id.
    pub struct EchoMapping(pub &'static str);

    impl Transport for EchoMapping {
        fn perform(&self, request: &ApiRequest) -> Result<RawResponse, RemoteError> {
            let commands: Value = serde_json::from_str(request.form_value("commands").unwrap()).unwrap();
            let temp_id = commands[0]["temp_id"].as_str().unwrap().to_string();
            let mut mapping = serde_json::Map::new();
            mapping.insert(temp_id, Value::from(self.0));
            Ok(RawResponse::ok(
                serde_json::json!({ "temp_id_mapping": mapping }).to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_content_is_empty_success() {
        let fake = FakeTransport::default();
        fake.reply(Ok(RawResponse::no_content()));
        let client = fake.client();
        assert!(client.close_task("12").is_ok());

        let request = fake.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.segments, vec!["tasks", "12", "close"]);
        assert_eq!(request.describe(), "POST rest:tasks/12/close");
    }

    #[test]
    fn test_undecodable_body_is_decode_error() {
        let fake = FakeTransport::default();
        fake.reply(Ok(RawResponse::ok("<html>oops</html>")));
        let err = fake.client().get_projects().unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[test]
    fn test_empty_200_body_is_decode_error() {
        let fake = FakeTransport::default();
        fake.reply(Ok(RawResponse::ok("")));
        assert!(matches!(
            fake.client().get_projects(),
            Err(RemoteError::Decode(_))
        ));
    }

    #[test]
    fn test_transport_error_passes_through() {
        let fake = FakeTransport::default();
        fake.reply(Err(RemoteError::Transport("connection reset".into())));
        let err = fake.client().delete_task("1").unwrap_err();
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[test]
    fn test_error_status() {
        let fake = FakeTransport::default();
        fake.reply(Ok(RawResponse {
            status: 403,
            body: "Forbidden".into(),
        }));
        assert!(matches!(
            fake.client().get_projects(),
            Err(RemoteError::Status(403))
        ));
    }

    #[test]
    fn test_get_tasks_queries_scope() {
        let fake = FakeTransport::default();
        fake.reply_json(json!([])).reply_json(json!([]));
        let client = fake.client();

        client.get_tasks(&Scope::Today).unwrap();
        assert_eq!(
            fake.last_request().unwrap().query,
            vec![("filter".to_string(), "today".to_string())]
        );

        let scope = Scope::Project {
            id: "55".into(),
            name: "Work".into(),
        };
        client.get_tasks(&scope).unwrap();
        let request = fake.last_request().unwrap();
        assert_eq!(request.segments, vec!["tasks"]);
        assert_eq!(
            request.query,
            vec![("project_id".to_string(), "55".to_string())]
        );
    }

    #[test]
    fn test_sync_sends_commands_form() {
        let fake = FakeTransport::default();
        fake.reply_json(json!({ "sync_status": {} }));
        let command = SyncCommand::reopen("8");
        fake.client().sync(std::slice::from_ref(&command)).unwrap();

        let request = fake.last_request().unwrap();
        assert_eq!(request.surface, Surface::Sync);
        let sent: Value = serde_json::from_str(request.form_value("commands").unwrap()).unwrap();
        assert_eq!(sent[0]["uuid"], command.uuid.as_str());
        assert_eq!(sent[0]["type"], "item_update");
    }

    #[test]
    fn test_sync_rejection() {
        let fake = FakeTransport::default();
        let command = SyncCommand::reopen("8");
        let mut status = serde_json::Map::new();
        status.insert(
            command.uuid.clone(),
            json!({ "error_code": 20, "error": "Invalid argument value" }),
        );
        fake.reply_json(json!({ "sync_status": status }));
        let err = fake.client().sync(&[command]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "server rejected item_update: Invalid argument value"
        );
    }
}
