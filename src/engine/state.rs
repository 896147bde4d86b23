//! Conversation state types

use crate::store::{Task, UserId};
use chrono::{DateTime, Utc};

/// Where a user currently is in the dialogue.
///
/// A user has at most one in-flight state; the entry transitions (`Start`,
/// the menu fallback) rebuild it from `Idle`, dropping whatever a previous
/// flow had captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Ready at the root menu
    #[default]
    Idle,

    /// "add" selected, waiting for the task name
    AwaitingTaskName,

    /// Name captured, waiting for a time expression
    AwaitingTaskTime { name: String },

    /// Deletion menu rendered; `offered` is the name snapshot it showed.
    /// Confirmation re-validates the chosen index against a fresh list read
    /// so a mutated list never gets the wrong task deleted.
    AwaitingDeleteSelection { offered: Vec<String> },
}

impl ChatState {
    /// Short tag for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ChatState::Idle => "idle",
            ChatState::AwaitingTaskName => "awaiting_task_name",
            ChatState::AwaitingTaskTime { .. } => "awaiting_task_time",
            ChatState::AwaitingDeleteSelection { .. } => "awaiting_delete_selection",
        }
    }
}

/// Immutable view handed to one transition: the reference instant for time
/// parsing and a fresh snapshot of the user's tasks, both read by the
/// session just before the transition runs.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub user_id: UserId,
    pub now: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl TurnContext {
    pub fn new(user_id: UserId, now: DateTime<Utc>, tasks: Vec<Task>) -> Self {
        Self {
            user_id,
            now,
            tasks,
        }
    }
}
