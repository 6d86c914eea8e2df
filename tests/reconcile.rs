//! Session behavior through the public API, against a scripted transport.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use taskdeck::io::{ApiRequest, RawResponse, RemoteClient, RemoteError, Transport};
use taskdeck::model::{CompleteVia, Priority, Scope, Task, TaskCollection};
use taskdeck::ops::menu::MenuEntry;
use taskdeck::ops::reconcile::{Outcome, ReconcileError, Session, SessionOptions};

enum Reply {
    Raw(Result<RawResponse, RemoteError>),
    /// Map the batch's temp_id to this id
    Created(&'static str),
}

#[derive(Clone, Default)]
struct Scripted {
    requests: Rc<RefCell<Vec<ApiRequest>>>,
    replies: Rc<RefCell<VecDeque<Reply>>>,
}

impl Scripted {
    fn then(&self, reply: Reply) -> &Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    fn ok(&self) -> &Self {
        self.then(Reply::Raw(Ok(RawResponse::no_content())))
    }

    fn fail(&self) -> &Self {
        self.then(Reply::Raw(Err(RemoteError::Transport("connection reset".into()))))
    }

    fn client(&self) -> RemoteClient {
        RemoteClient::new(Box::new(self.clone()))
    }

    fn sent(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Every Sync command sent so far
    fn commands(&self) -> Vec<Value> {
        self.requests
            .borrow()
            .iter()
            .filter_map(|r| r.form_value("commands"))
            .flat_map(|c| match serde_json::from_str::<Value>(c).unwrap() {
                Value::Array(items) => items,
                _ => Vec::new(),
            })
            .collect()
    }
}

impl Transport for Scripted {
    fn perform(&self, request: &ApiRequest) -> Result<RawResponse, RemoteError> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Raw(reply)) => reply,
            Some(Reply::Created(id)) => {
                let commands: Value =
                    serde_json::from_str(request.form_value("commands").unwrap()).unwrap();
                let temp_id = commands[0]["temp_id"].as_str().unwrap();
                let body = json!({ "temp_id_mapping": { temp_id: id } });
                Ok(RawResponse::ok(body.to_string()))
            }
            None => Err(RemoteError::Transport("no scripted reply".into())),
        }
    }
}

fn session_with(tasks: &[(&str, u8)], options: SessionOptions) -> Session {
    let tasks = tasks
        .iter()
        .map(|(id, level)| Task::new(*id, format!("task {id}"), Priority::new(*level).unwrap()))
        .collect();
    let scope = Scope::Project {
        id: "p1".into(),
        name: "Home".into(),
    };
    Session::from_collection(scope, TaskCollection::from_tasks(tasks).unwrap(), options)
}

fn assert_aligned(session: &Session) {
    let collection = session.collection();
    let entries = session.menu().entries();
    if collection.is_empty() {
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_selectable());
        return;
    }
    assert_eq!(entries.len(), collection.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry {
            MenuEntry::Task { task_id, .. } => assert_eq!(task_id, &collection.get(i).unwrap().id),
            MenuEntry::Info(_) => panic!("info row in a non-empty menu"),
        }
        assert_eq!(session.resolve(i).unwrap().unwrap().id, collection.get(i).unwrap().id);
    }
}

#[test]
fn priority_sort_is_stable() {
    let mut session = session_with(
        &[("a", 2), ("b", 4), ("c", 2), ("d", 4)],
        SessionOptions::default(),
    );
    session.sort_by_priority().unwrap();
    assert_eq!(session.collection().ids(), vec!["b", "d", "a", "c"]);
    assert!(session.is_sorted());
    assert_aligned(&session);
}

#[test]
fn alignment_holds_across_a_mixed_sequence() {
    let remote = Scripted::default();
    remote
        .ok() // complete
        .then(Reply::Created("10")) // create
        .ok() // reopen
        .fail() // complete, fails
        .ok(); // delete
    let client = remote.client();
    let mut session = session_with(&[("a", 1), ("b", 3), ("c", 4)], SessionOptions::default());

    session.complete(&client, 1).unwrap();
    assert_aligned(&session);
    session.sort_by_priority().unwrap();
    assert_aligned(&session);
    session.create(&client, "new one").unwrap();
    assert_aligned(&session);
    session.reopen(&client, 0).unwrap();
    assert_aligned(&session);
    assert!(session.complete(&client, 0).is_err());
    assert_aligned(&session);
    session.delete(&client, "a").unwrap();
    assert_aligned(&session);

    assert_eq!(session.collection().ids(), vec!["c", "10"]);
}

#[test]
fn failed_complete_changes_nothing() {
    let remote = Scripted::default();
    remote.fail();
    let mut session = session_with(&[("a", 1), ("b", 2)], SessionOptions::default());
    let before = session.clone();

    let err = session.complete(&remote.client(), 0).unwrap_err();
    assert!(matches!(err, ReconcileError::Remote(RemoteError::Transport(_))));
    assert_eq!(session.collection(), before.collection());
    assert_eq!(session.menu(), before.menu());
    assert_eq!(session.state(), before.state());
}

#[test]
fn tokens_are_unique_across_commands() {
    let remote = Scripted::default();
    let options = SessionOptions {
        complete_via: CompleteVia::Sync,
        ..SessionOptions::default()
    };
    let mut session = session_with(&[("a", 1), ("b", 1), ("c", 1)], options);
    let client = remote.client();

    for i in 0..5 {
        remote.then(Reply::Created(["n0", "n1", "n2", "n3", "n4"][i]));
        session.create(&client, &format!("item {i}")).unwrap();
        remote.then(Reply::Raw(Ok(RawResponse::ok("{}"))));
        session.reopen(&client, 0).unwrap();
        remote.then(Reply::Raw(Ok(RawResponse::ok("{}"))));
        session.complete(&client, 0).unwrap();
    }

    let commands = remote.commands();
    assert_eq!(commands.len(), 15);
    let uuids: HashSet<&str> = commands.iter().map(|c| c["uuid"].as_str().unwrap()).collect();
    assert_eq!(uuids.len(), 15);
    let temp_ids: HashSet<&str> = commands.iter().filter_map(|c| c["temp_id"].as_str()).collect();
    assert_eq!(temp_ids.len(), 5);
}

#[test]
fn create_appends_mapped_id() {
    let remote = Scripted::default();
    remote.then(Reply::Created("9999"));
    let mut session = session_with(&[("a", 2)], SessionOptions::default());

    session.create(&remote.client(), "Buy milk").unwrap();
    let created = session.collection().get(1).unwrap();
    assert_eq!(created.id, "9999");
    assert_eq!(created.content, "Buy milk");
    assert_aligned(&session);
}

#[test]
fn create_without_mapping_appends_nothing() {
    let remote = Scripted::default();
    remote.then(Reply::Raw(Ok(RawResponse::ok(r#"{"temp_id_mapping":{}}"#))));
    let mut session = session_with(&[("a", 2)], SessionOptions::default());

    let err = session.create(&remote.client(), "Buy milk").unwrap_err();
    assert!(matches!(err, ReconcileError::Mapping(_)));
    assert_eq!(session.collection().ids(), vec!["a"]);
}

#[test]
fn completing_the_last_task_leaves_the_placeholder() {
    let remote = Scripted::default();
    remote.ok();
    let mut session = session_with(&[("a", 1)], SessionOptions::default());
    let client = remote.client();

    session.complete(&client, 0).unwrap();
    assert!(session.collection().is_empty());
    assert!(session.menu().is_placeholder());
    assert_aligned(&session);

    assert_eq!(session.complete(&client, 0).unwrap(), Outcome::NoSelection);
    assert_eq!(remote.sent(), 1);
}

#[test]
fn delete_targets_identity_not_position() {
    let remote = Scripted::default();
    remote.ok();
    let mut session = session_with(&[("a", 1), ("b", 4), ("c", 2)], SessionOptions::default());

    // The user confirms deleting "a" (row 0), then the list is re-sorted
    let target = session.resolve(0).unwrap().unwrap().id.clone();
    session.sort_by_priority().unwrap();
    session.delete(&remote.client(), &target).unwrap();

    assert_eq!(session.collection().ids(), vec!["b", "c"]);
    let request = remote.requests.borrow()[0].clone();
    assert_eq!(request.segments, vec!["tasks", "a"]);
}
