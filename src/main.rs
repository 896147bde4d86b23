//! taskbot - chat-driven task list with calendar mirroring
//!
//! A Rust backend implementing a conversation state machine for managing
//! per-user task lists, with committed tasks mirrored into an external
//! calendar as one-hour events.

mod calendar;
mod console;
mod engine;
mod menu;
mod runtime;
mod store;
mod timeparse;

use calendar::{
    CalendarConfig, CalendarNotifier, CalendarSink, DisabledCalendar, HttpCalendarClient,
};
use runtime::RuntimeManager;
use std::sync::Arc;
use store::TaskStore;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Queue depth for the calendar sync hand-off
const CALENDAR_QUEUE: usize = 64;

/// Queue depth for responses on their way to the transport
const OUTBOUND_QUEUE: usize = 64;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskbot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Calendar boundary: a missing token degrades to a logging-only sink.
    let config = CalendarConfig::from_env();
    let (calendar, calendar_worker) = match &config.token {
        Some(token) => {
            tracing::info!(
                base_url = %config.base_url,
                calendar_id = %config.calendar_id,
                "calendar sync enabled"
            );
            let client = Arc::new(HttpCalendarClient::new(
                token.clone(),
                &config.base_url,
                &config.calendar_id,
            ));
            let (notifier, handle) = CalendarNotifier::spawn(client, CALENDAR_QUEUE);
            (Arc::new(notifier) as Arc<dyn CalendarSink>, Some(handle))
        }
        None => {
            tracing::warn!("No calendar token configured. Set CALENDAR_API_TOKEN to enable sync.");
            (Arc::new(DisabledCalendar) as Arc<dyn CalendarSink>, None)
        }
    };

    let store = TaskStore::new();
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
    let manager = Arc::new(RuntimeManager::new(store, calendar.clone(), outbound_tx));

    console::run(manager.clone(), outbound_rx).await;

    // Tear down: dropping the manager closes session inboxes; once the last
    // session exits, the calendar queue closes and the worker drains it.
    drop(manager);
    drop(calendar);
    if let Some(handle) = calendar_worker {
        let _ = handle.await;
    }
}
