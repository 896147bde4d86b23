//! Effects produced by state transitions

use crate::store::Task;
use chrono::{DateTime, Utc};

/// Side effects for the session runtime to apply, in order, before the
/// turn's response goes out. A commit always precedes its calendar hand-off,
/// and both precede the confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a task to the user's list
    Commit { task: Task },

    /// Remove the task at an already-validated index
    Remove { index: usize },

    /// Hand the committed task to the calendar worker (best-effort; the
    /// worker owns failures)
    SyncCalendar {
        summary: String,
        start: DateTime<Utc>,
    },
}
