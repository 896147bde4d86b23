//! Session runtime
//!
//! One spawned session task per user serializes that user's turns: events
//! go in through an mpsc inbox and responses come out on a shared outbound
//! channel the transport consumes. The engine stays pure; this layer reads
//! the store, runs transitions, and applies effects in order.

mod session;

#[cfg(test)]
mod testing;

pub use session::SessionRuntime;

use crate::calendar::CalendarSink;
use crate::engine::Event;
use crate::menu::Response;
use crate::store::{TaskStore, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Inbox depth per user session
const SESSION_INBOX: usize = 32;

/// A response addressed to a user, for the transport to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub user_id: UserId,
    pub response: Response,
}

/// Handle to a running session
struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
}

/// Manager for all user sessions
pub struct RuntimeManager {
    store: TaskStore,
    calendar: Arc<dyn CalendarSink>,
    outbound_tx: mpsc::Sender<Outbound>,
    sessions: RwLock<HashMap<UserId, SessionHandle>>,
}

impl RuntimeManager {
    pub fn new(
        store: TaskStore,
        calendar: Arc<dyn CalendarSink>,
        outbound_tx: mpsc::Sender<Outbound>,
    ) -> Self {
        Self {
            store,
            calendar,
            outbound_tx,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Route an inbound event to its user's session, creating the session on
    /// first contact. Sessions for different users run concurrently; events
    /// for one user are serialized by its inbox.
    pub async fn dispatch(&self, user_id: UserId, event: Event) {
        let event_tx = self.get_or_create(user_id).await;
        if event_tx.send(event).await.is_err() {
            tracing::warn!(user_id = %user_id, "session inbox closed, dropping event");
            self.sessions.write().await.remove(&user_id);
        }
    }

    async fn get_or_create(&self, user_id: UserId) -> mpsc::Sender<Event> {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&user_id) {
                return handle.event_tx.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        // Re-check under the write lock: a concurrent dispatch may have won.
        if let Some(handle) = sessions.get(&user_id) {
            return handle.event_tx.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(SESSION_INBOX);
        let session = SessionRuntime::new(
            user_id,
            self.store.clone(),
            self.calendar.clone(),
            event_rx,
            self.outbound_tx.clone(),
        );
        tokio::spawn(session.run());

        sessions.insert(
            user_id,
            SessionHandle {
                event_tx: event_tx.clone(),
            },
        );
        event_tx
    }
}
