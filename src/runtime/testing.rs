//! End-to-end tests for the session runtime
//!
//! Drive the manager the way a transport would and observe the store, the
//! calendar sink, and the outbound responses.

use super::*;
use crate::calendar::{CalendarClient, CalendarError, CalendarEvent, CalendarNotifier};
use crate::engine::MenuAction;
use crate::store::Task;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Mutex;

/// Records enqueued calendar events instead of creating them.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<CalendarEvent>>,
}

impl CalendarSink for RecordingSink {
    fn enqueue(&self, event: CalendarEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct Harness {
    manager: RuntimeManager,
    store: TaskStore,
    sink: Arc<RecordingSink>,
    outbound_rx: mpsc::Receiver<Outbound>,
}

fn harness() -> Harness {
    let store = TaskStore::new();
    let sink = Arc::new(RecordingSink::default());
    let (outbound_tx, outbound_rx) = mpsc::channel(16);
    let manager = RuntimeManager::new(store.clone(), sink.clone(), outbound_tx);
    Harness {
        manager,
        store,
        sink,
        outbound_rx,
    }
}

impl Harness {
    async fn send(&mut self, user: UserId, event: Event) -> Response {
        self.manager.dispatch(user, event).await;
        self.outbound_rx.recv().await.expect("response").response
    }
}

#[tokio::test]
async fn add_flow_commits_then_syncs_then_confirms() {
    let mut h = harness();
    let user = UserId(7);

    let greeting = h.send(user, Event::Start).await;
    assert!(greeting.text.starts_with("Hi!"));

    let name_prompt = h
        .send(
            user,
            Event::Select {
                action: MenuAction::Add,
            },
        )
        .await;
    assert_eq!(name_prompt.text, "Enter the task name:");

    h.send(
        user,
        Event::Text {
            text: "Buy milk".to_string(),
        },
    )
    .await;

    let confirmation = h
        .send(
            user,
            Event::Text {
                text: "2024-01-02 15:00".to_string(),
            },
        )
        .await;
    assert_eq!(
        confirmation.text,
        "Task 'Buy milk' scheduled for 2024-01-02 15:00!"
    );

    // By the time the confirmation is out, the task is committed and the
    // calendar hand-off has happened.
    let expected_at = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
    let tasks = h.store.list(user).await;
    assert_eq!(tasks, vec![Task::new("Buy milk", expected_at)]);

    let events = h.sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], CalendarEvent::one_hour("Buy milk", expected_at));
}

#[tokio::test]
async fn delete_flow_removes_the_selected_task() {
    let mut h = harness();
    let user = UserId(7);
    let when = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
    for name in ["A", "B", "C"] {
        h.store.add(user, Task::new(name, when)).await;
    }

    let menu = h
        .send(
            user,
            Event::Select {
                action: MenuAction::Delete,
            },
        )
        .await;
    assert_eq!(menu.menu.len(), 3);

    let confirmation = h.send(user, Event::IndexSelect { index: 1 }).await;
    assert_eq!(confirmation.text, "Task 'B' deleted!");

    let names: Vec<String> = h
        .store
        .list(user)
        .await
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["A", "C"]);
}

#[tokio::test]
async fn unparseable_time_commits_nothing() {
    let mut h = harness();
    let user = UserId(7);

    h.send(
        user,
        Event::Select {
            action: MenuAction::Add,
        },
    )
    .await;
    h.send(
        user,
        Event::Text {
            text: "Buy milk".to_string(),
        },
    )
    .await;
    let reprompt = h
        .send(
            user,
            Event::Text {
                text: "gibberish".to_string(),
            },
        )
        .await;
    assert!(reprompt.text.starts_with("Couldn't understand"));

    assert!(h.store.list(user).await.is_empty());
    assert!(h.sink.events.lock().unwrap().is_empty());

    // Still awaiting a time: a parseable retry completes the add.
    let confirmation = h
        .send(
            user,
            Event::Text {
                text: "2024-01-02 15:00".to_string(),
            },
        )
        .await;
    assert!(confirmation.text.starts_with("Task 'Buy milk' scheduled"));
    assert_eq!(h.store.len(user).await, 1);
}

struct FailingClient;

#[async_trait]
impl CalendarClient for FailingClient {
    async fn create_event(&self, _event: &CalendarEvent) -> Result<String, CalendarError> {
        Err(CalendarError::server_error("calendar is down"))
    }
}

#[tokio::test]
async fn calendar_failure_does_not_affect_the_committed_add() {
    let store = TaskStore::new();
    let (notifier, worker) = CalendarNotifier::spawn(Arc::new(FailingClient), 8);
    let (outbound_tx, mut outbound_rx) = mpsc::channel(16);
    let manager = RuntimeManager::new(store.clone(), Arc::new(notifier), outbound_tx);
    let user = UserId(3);

    manager
        .dispatch(
            user,
            Event::Select {
                action: MenuAction::Add,
            },
        )
        .await;
    outbound_rx.recv().await.unwrap();
    manager
        .dispatch(
            user,
            Event::Text {
                text: "Buy milk".to_string(),
            },
        )
        .await;
    outbound_rx.recv().await.unwrap();
    manager
        .dispatch(
            user,
            Event::Text {
                text: "2024-01-02 15:00".to_string(),
            },
        )
        .await;
    let confirmation = outbound_rx.recv().await.unwrap().response;

    // The sync will fail in the background; the add already succeeded and
    // the user already has their confirmation.
    assert!(confirmation.text.starts_with("Task 'Buy milk' scheduled"));
    assert_eq!(store.len(user).await, 1);

    drop(manager);
    worker.await.unwrap();
}

#[tokio::test]
async fn users_get_independent_sessions() {
    let mut h = harness();
    let when = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
    h.store.add(UserId(1), Task::new("mine", when)).await;

    // User 2 mid-add; user 1's listing is unaffected by it.
    h.send(
        UserId(2),
        Event::Select {
            action: MenuAction::Add,
        },
    )
    .await;
    let listing = h
        .send(
            UserId(1),
            Event::Select {
                action: MenuAction::List,
            },
        )
        .await;
    assert_eq!(listing.text, "Your tasks:\n1. mine - 2024-01-02 09:00");
}
