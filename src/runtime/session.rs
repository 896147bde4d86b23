//! Per-user session loop

use super::Outbound;
use crate::calendar::{CalendarEvent, CalendarSink};
use crate::engine::{transition, ChatState, Effect, Event, TurnContext};
use crate::store::{TaskStore, UserId};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Owns one user's conversation state and serializes their turns.
pub struct SessionRuntime {
    user_id: UserId,
    state: ChatState,
    store: TaskStore,
    calendar: Arc<dyn CalendarSink>,
    event_rx: mpsc::Receiver<Event>,
    outbound_tx: mpsc::Sender<Outbound>,
}

impl SessionRuntime {
    pub fn new(
        user_id: UserId,
        store: TaskStore,
        calendar: Arc<dyn CalendarSink>,
        event_rx: mpsc::Receiver<Event>,
        outbound_tx: mpsc::Sender<Outbound>,
    ) -> Self {
        Self {
            user_id,
            state: ChatState::Idle,
            store,
            calendar,
            event_rx,
            outbound_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(user_id = %self.user_id, "session started");
        while let Some(event) = self.event_rx.recv().await {
            self.turn(event).await;
        }
        tracing::info!(user_id = %self.user_id, "session stopped");
    }

    /// One turn: fresh context, pure transition, effects in order, then the
    /// response. The store commit precedes the calendar hand-off, and both
    /// precede the confirmation going out.
    async fn turn(&mut self, event: Event) {
        let tasks = self.store.list(self.user_id).await;
        let ctx = TurnContext::new(self.user_id, Utc::now(), tasks);

        let event_kind = event.kind();
        let turn = transition(&self.state, &ctx, event);

        tracing::info!(
            user_id = %self.user_id,
            event = event_kind,
            from = self.state.kind(),
            to = turn.next.kind(),
            effects = turn.effects.len(),
            "turn"
        );

        self.state = turn.next;
        for effect in turn.effects {
            self.apply(effect).await;
        }

        let outbound = Outbound {
            user_id: self.user_id,
            response: turn.response,
        };
        if self.outbound_tx.send(outbound).await.is_err() {
            tracing::warn!(user_id = %self.user_id, "transport gone, dropping response");
        }
    }

    async fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Commit { task } => {
                self.store.add(self.user_id, task).await;
            }
            Effect::Remove { index } => {
                // Validated by the transition against this turn's snapshot;
                // with turns serialized per user this cannot race.
                if let Err(e) = self.store.remove_at(self.user_id, index).await {
                    tracing::error!(user_id = %self.user_id, error = %e, "validated removal failed");
                }
            }
            Effect::SyncCalendar { summary, start } => {
                self.calendar.enqueue(CalendarEvent::one_hour(summary, start));
            }
        }
    }
}
