//! Property-based tests for the conversation engine
//!
//! These verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::store::{Task, UserId};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,12}"
}

fn arb_task() -> impl Strategy<Value = Task> {
    (arb_name(), 0i64..3_000_000_000).prop_map(|(name, secs)| {
        Task::new(name, Utc.timestamp_opt(secs, 0).unwrap())
    })
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    proptest::collection::vec(arb_task(), 0..4)
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::Idle),
        Just(ChatState::AwaitingTaskName),
        arb_name().prop_map(|name| ChatState::AwaitingTaskTime { name }),
        proptest::collection::vec(arb_name(), 0..4)
            .prop_map(|offered| ChatState::AwaitingDeleteSelection { offered }),
    ]
}

fn arb_action() -> impl Strategy<Value = MenuAction> {
    prop_oneof![
        Just(MenuAction::Add),
        Just(MenuAction::Delete),
        Just(MenuAction::List),
        Just(MenuAction::Menu),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Start),
        arb_action().prop_map(|action| Event::Select { action }),
        "[ -~]{0,20}".prop_map(|text| Event::Text { text }),
        (0usize..6).prop_map(|index| Event::IndexSelect { index }),
        "[a-z]{1,8}".prop_map(|tag| Event::Unknown { tag }),
    ]
}

fn ctx(tasks: Vec<Task>) -> TurnContext {
    TurnContext::new(
        UserId(1),
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        tasks,
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The transition is total and every response carries controls the user
    /// can act on.
    #[test]
    fn transition_always_yields_a_usable_response(
        state in arb_state(),
        tasks in arb_tasks(),
        event in arb_event(),
    ) {
        let turn = transition(&state, &ctx(tasks), event);
        prop_assert!(!turn.response.menu.is_empty());
    }

    /// `Remove` effects only ever carry indices validated against both the
    /// rendered snapshot and the fresh list.
    #[test]
    fn remove_effects_are_validated(
        state in arb_state(),
        tasks in arb_tasks(),
        event in arb_event(),
    ) {
        let context = ctx(tasks);
        let turn = transition(&state, &context, event);
        for effect in &turn.effects {
            if let Effect::Remove { index } = effect {
                prop_assert!(*index < context.tasks.len());
                if let ChatState::AwaitingDeleteSelection { offered } = &state {
                    prop_assert_eq!(&context.tasks[*index].name, &offered[*index]);
                }
            }
        }
    }

    /// Start and the menu fallback reset to Idle from anywhere, with no
    /// side effects and no pending data.
    #[test]
    fn entry_events_reset_to_idle(
        state in arb_state(),
        tasks in arb_tasks(),
        use_start in any::<bool>(),
    ) {
        let event = if use_start {
            Event::Start
        } else {
            Event::Select { action: MenuAction::Menu }
        };
        let turn = transition(&state, &ctx(tasks), event);
        prop_assert_eq!(turn.next, ChatState::Idle);
        prop_assert!(turn.effects.is_empty());
    }

    /// Unrecognized tags never change state or touch the store.
    #[test]
    fn unknown_tags_are_inert(
        state in arb_state(),
        tasks in arb_tasks(),
        tag in "[a-z]{1,8}",
    ) {
        let turn = transition(&state, &ctx(tasks), Event::Unknown { tag });
        prop_assert_eq!(turn.next, state);
        prop_assert!(turn.effects.is_empty());
    }

    /// A commit is always immediately followed by its calendar hand-off for
    /// the same task.
    #[test]
    fn commit_pairs_with_calendar_sync(
        state in arb_state(),
        tasks in arb_tasks(),
        event in arb_event(),
    ) {
        let turn = transition(&state, &ctx(tasks), event);
        for (i, effect) in turn.effects.iter().enumerate() {
            if let Effect::Commit { task } = effect {
                match turn.effects.get(i + 1) {
                    Some(Effect::SyncCalendar { summary, start }) => {
                        prop_assert_eq!(summary, &task.name);
                        prop_assert_eq!(*start, task.scheduled_at);
                    }
                    other => prop_assert!(false, "commit not followed by sync: {other:?}"),
                }
            }
        }
    }

    /// Text that parses as no time form leaves the pending add untouched:
    /// same state, no store mutation, no calendar call.
    #[test]
    fn failed_parse_never_mutates(
        name in arb_name(),
        tasks in arb_tasks(),
        text in "[b-df-hj-np-tv-z]{5,15}",
    ) {
        let state = ChatState::AwaitingTaskTime { name };
        let turn = transition(&state, &ctx(tasks), Event::Text { text });
        prop_assert_eq!(turn.next, state);
        prop_assert!(turn.effects.is_empty());
    }
}
