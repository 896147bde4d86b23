//! Best-effort calendar hand-off
//!
//! Sessions enqueue; a worker task drains the queue and calls the client.
//! Failures are logged with their classification and never reach the
//! conversation, and a full queue drops the request loudly rather than
//! blocking a reply.

use super::{CalendarClient, CalendarEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Enqueue-only face of the notifier, as seen by session runtimes.
pub trait CalendarSink: Send + Sync {
    /// Hand off an event for background creation. Must not block.
    fn enqueue(&self, event: CalendarEvent);
}

/// Queue plus drain-worker pair
pub struct CalendarNotifier {
    tx: mpsc::Sender<CalendarEvent>,
    shutdown: CancellationToken,
}

impl CalendarNotifier {
    /// Spawn the drain worker. The returned handle resolves once the queue
    /// closes (all notifier clones dropped) or `shutdown` is called.
    pub fn spawn(client: Arc<dyn CalendarClient>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(drain(client, rx, shutdown.clone()));
        (Self { tx, shutdown }, handle)
    }

    /// Stop the worker without waiting for queued requests.
    #[allow(dead_code)] // For abnormal shutdown paths; normal teardown drains
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl CalendarSink for CalendarNotifier {
    fn enqueue(&self, event: CalendarEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(summary = %event.summary, "calendar queue full, dropping sync request");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::warn!(summary = %event.summary, "calendar worker stopped, dropping sync request");
            }
        }
    }
}

/// Sink installed when no calendar credentials are configured.
pub struct DisabledCalendar;

impl CalendarSink for DisabledCalendar {
    fn enqueue(&self, event: CalendarEvent) {
        tracing::debug!(summary = %event.summary, "calendar sync disabled, skipping");
    }
}

async fn drain(
    client: Arc<dyn CalendarClient>,
    mut rx: mpsc::Receiver<CalendarEvent>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => break,

            maybe = rx.recv() => match maybe {
                Some(event) => create(client.as_ref(), event).await,
                None => break,
            },
        }
    }
    tracing::debug!("calendar worker stopped");
}

async fn create(client: &dyn CalendarClient, event: CalendarEvent) {
    match client.create_event(&event).await {
        Ok(link) => {
            tracing::info!(summary = %event.summary, link = %link, "task mirrored to calendar");
        }
        Err(e) => {
            tracing::warn!(
                summary = %event.summary,
                kind = ?e.kind,
                retryable = e.kind.is_retryable(),
                error = %e,
                "calendar sync failed"
            );
        }
    }
}
