//! Calendar mirroring
//!
//! Committed tasks are mirrored into an external calendar as one-hour
//! events. The hand-off is a bounded queue drained by a worker task; the
//! conversation flow never waits on the outcome and never surfaces it.

mod error;
mod http;
mod notifier;

pub use error::{CalendarError, CalendarErrorKind};
pub use http::{CalendarConfig, HttpCalendarClient};
pub use notifier::{CalendarNotifier, CalendarSink, DisabledCalendar};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Length of the calendar slot created for each task.
const EVENT_DURATION_HOURS: i64 = 1;

/// A calendar event to be created (simplified representation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// The standard one-hour slot starting at `start`.
    pub fn one_hour(summary: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            summary: summary.into(),
            start,
            end: start + Duration::hours(EVENT_DURATION_HOURS),
        }
    }
}

/// Client boundary to the external calendar service.
///
/// Credential and session lifecycle are managed outside this crate;
/// implementations receive a ready-to-use token.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Create an event, returning a link to it.
    async fn create_event(&self, event: &CalendarEvent) -> Result<String, CalendarError>;
}
