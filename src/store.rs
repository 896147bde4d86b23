//! In-memory per-user task storage

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Opaque, stable identifier for a chat participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A scheduled task, owned exclusively by one user's list.
///
/// Tasks have no identity beyond their position in that list; `scheduled_at`
/// is always a successfully parsed instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
}

impl Task {
    pub fn new(name: impl Into<String>, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            scheduled_at,
        }
    }
}

/// Storage errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("task index {index} is out of range (list has {len} tasks)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Per-user ordered task lists, shared between sessions.
///
/// Lists are created lazily on first add and live for the lifetime of the
/// process. Mutations hold the write lock for the whole operation, so index
/// resolution and removal cannot interleave with another mutation.
#[derive(Clone, Default)]
pub struct TaskStore {
    inner: Arc<RwLock<HashMap<UserId, Vec<Task>>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the user's list, creating the list if absent.
    pub async fn add(&self, user: UserId, task: Task) {
        let mut lists = self.inner.write().await;
        lists.entry(user).or_default().push(task);
    }

    /// Snapshot of the user's tasks in insertion order; empty if none.
    pub async fn list(&self, user: UserId) -> Vec<Task> {
        let lists = self.inner.read().await;
        lists.get(&user).cloned().unwrap_or_default()
    }

    /// Number of tasks the user currently has.
    #[allow(dead_code)] // Useful for tests
    pub async fn len(&self, user: UserId) -> usize {
        let lists = self.inner.read().await;
        lists.get(&user).map_or(0, Vec::len)
    }

    /// Remove and return the task at `index` (0-based, current list order).
    ///
    /// Fails without touching the list when `index` is out of range.
    pub async fn remove_at(&self, user: UserId, index: usize) -> Result<Task, StoreError> {
        let mut lists = self.inner.write().await;
        let list = lists.get_mut(&user);
        let len = list.as_ref().map_or(0, |l| l.len());
        match list {
            Some(list) if index < len => Ok(list.remove(index)),
            _ => Err(StoreError::IndexOutOfRange { index, len }),
        }
    }
}
