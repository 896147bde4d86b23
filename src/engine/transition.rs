//! Pure state transition function
//!
//! Total over (state, event): every inbound event produces a response, and
//! unrecognized input degrades to the root menu without changing state.

use super::effect::Effect;
use super::event::{Event, MenuAction};
use super::state::{ChatState, TurnContext};
use crate::menu::{delete_menu, main_menu_link, root_menu, Response};
use crate::store::Task;
use crate::timeparse;

const GREETING: &str = "Hi! Pick an action:";
const PICK_ACTION: &str = "Pick an action:";
const NAME_PROMPT: &str = "Enter the task name:";
const TIME_PROMPT: &str =
    "Enter a time for the task (for example: 'tomorrow at 15:00' or '2023-09-18 14:30'):";
const TIME_REPROMPT: &str =
    "Couldn't understand that date/time. Try again (for example: 'tomorrow at 15:00' or '2023-09-18 14:30').";
const NO_TASKS: &str = "You have no tasks.";
const PICK_DELETE: &str = "Pick a task to delete:";
const LIST_CHANGED: &str = "The task list changed. Pick a task to delete:";
const INVALID_INDEX: &str = "Invalid task number.";
const UNKNOWN_ACTION: &str = "Unknown action.";

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub next: ChatState,
    pub response: Response,
    pub effects: Vec<Effect>,
}

impl Turn {
    fn new(next: ChatState, response: Response) -> Self {
        Self {
            next,
            response,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Resolve one inbound event against the current state.
///
/// Pure: given the same state, context, and event it always produces the
/// same turn, with no I/O. Transitions that end or abort a flow return to
/// `Idle` and carry no pending data forward.
pub fn transition(state: &ChatState, ctx: &TurnContext, event: Event) -> Turn {
    match (state, event) {
        // Entry points reset any in-flight flow.
        (_, Event::Start) => Turn::new(ChatState::Idle, Response::new(GREETING, root_menu())),
        (
            _,
            Event::Select {
                action: MenuAction::Menu,
            },
        ) => Turn::new(ChatState::Idle, Response::new(PICK_ACTION, root_menu())),

        (
            ChatState::Idle,
            Event::Select {
                action: MenuAction::Add,
            },
        ) => Turn::new(
            ChatState::AwaitingTaskName,
            Response::new(NAME_PROMPT, main_menu_link()),
        ),

        (
            ChatState::Idle,
            Event::Select {
                action: MenuAction::Delete,
            },
        ) => {
            if ctx.tasks.is_empty() {
                Turn::new(ChatState::Idle, Response::new(NO_TASKS, root_menu()))
            } else {
                let offered = ctx.tasks.iter().map(|t| t.name.clone()).collect();
                Turn::new(
                    ChatState::AwaitingDeleteSelection { offered },
                    Response::new(PICK_DELETE, delete_menu(&ctx.tasks)),
                )
            }
        }

        (
            ChatState::Idle,
            Event::Select {
                action: MenuAction::List,
            },
        ) => {
            if ctx.tasks.is_empty() {
                Turn::new(ChatState::Idle, Response::new(NO_TASKS, root_menu()))
            } else {
                let lines: Vec<String> = ctx
                    .tasks
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        format!("{}. {} - {}", i + 1, t.name, timeparse::format(t.scheduled_at))
                    })
                    .collect();
                let text = format!("Your tasks:\n{}", lines.join("\n"));
                Turn::new(ChatState::Idle, Response::new(text, root_menu()))
            }
        }

        (ChatState::AwaitingTaskName, Event::Text { text }) => Turn::new(
            ChatState::AwaitingTaskTime { name: text },
            Response::new(TIME_PROMPT, main_menu_link()),
        ),

        (ChatState::AwaitingTaskTime { name }, Event::Text { text }) => {
            match timeparse::parse(&text, ctx.now) {
                // Unparseable time: re-prompt, keep the pending name.
                None => Turn::new(
                    ChatState::AwaitingTaskTime { name: name.clone() },
                    Response::new(TIME_REPROMPT, main_menu_link()),
                ),
                Some(scheduled_at) => {
                    let confirmation = format!(
                        "Task '{}' scheduled for {}!",
                        name,
                        timeparse::format(scheduled_at)
                    );
                    Turn::new(ChatState::Idle, Response::new(confirmation, root_menu()))
                        .with_effect(Effect::Commit {
                            task: Task::new(name.clone(), scheduled_at),
                        })
                        .with_effect(Effect::SyncCalendar {
                            summary: name.clone(),
                            start: scheduled_at,
                        })
                }
            }
        }

        (ChatState::AwaitingDeleteSelection { offered }, Event::IndexSelect { index }) => {
            delete_selection(offered, ctx, index)
        }

        // Unknown tags and events the current state has no use for both
        // degrade to the root menu without touching the state.
        (state, _) => Turn::new(
            state.clone(),
            Response::new(UNKNOWN_ACTION, root_menu()),
        ),
    }
}

/// Confirm a deletion against both the rendered snapshot and a fresh read of
/// the list. Indices that were never offered are user errors; a snapshot
/// mismatch means the list mutated after the menu went out, and the menu is
/// re-rendered rather than deleting a task the user did not pick.
fn delete_selection(offered: &[String], ctx: &TurnContext, index: usize) -> Turn {
    if index >= offered.len() {
        return Turn::new(ChatState::Idle, Response::new(INVALID_INDEX, root_menu()));
    }

    match ctx.tasks.get(index) {
        Some(task) if task.name == offered[index] => {
            let confirmation = format!("Task '{}' deleted!", task.name);
            Turn::new(ChatState::Idle, Response::new(confirmation, root_menu()))
                .with_effect(Effect::Remove { index })
        }
        _ if ctx.tasks.is_empty() => {
            Turn::new(ChatState::Idle, Response::new(NO_TASKS, root_menu()))
        }
        _ => {
            let offered = ctx.tasks.iter().map(|t| t.name.clone()).collect();
            Turn::new(
                ChatState::AwaitingDeleteSelection { offered },
                Response::new(LIST_CHANGED, delete_menu(&ctx.tasks)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserId;
    use chrono::{TimeZone, Utc};

    fn ctx_with(tasks: Vec<Task>) -> TurnContext {
        TurnContext::new(
            UserId(1),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            tasks,
        )
    }

    fn task(name: &str) -> Task {
        Task::new(name, Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap())
    }

    fn select(action: MenuAction) -> Event {
        Event::Select { action }
    }

    fn text(s: &str) -> Event {
        Event::Text {
            text: s.to_string(),
        }
    }

    #[test]
    fn start_greets_with_root_menu_from_any_state() {
        let states = [
            ChatState::Idle,
            ChatState::AwaitingTaskName,
            ChatState::AwaitingTaskTime {
                name: "X".to_string(),
            },
            ChatState::AwaitingDeleteSelection {
                offered: vec!["X".to_string()],
            },
        ];
        for state in states {
            let turn = transition(&state, &ctx_with(vec![]), Event::Start);
            assert_eq!(turn.next, ChatState::Idle);
            assert_eq!(turn.response.text, GREETING);
            assert_eq!(turn.response.menu, root_menu());
            assert!(turn.effects.is_empty());
        }
    }

    #[test]
    fn add_selection_prompts_for_name() {
        let turn = transition(&ChatState::Idle, &ctx_with(vec![]), select(MenuAction::Add));
        assert_eq!(turn.next, ChatState::AwaitingTaskName);
        assert_eq!(turn.response.text, NAME_PROMPT);
        assert_eq!(turn.response.menu, main_menu_link());
    }

    #[test]
    fn name_input_prompts_for_time() {
        let turn = transition(
            &ChatState::AwaitingTaskName,
            &ctx_with(vec![]),
            text("Buy milk"),
        );
        assert_eq!(
            turn.next,
            ChatState::AwaitingTaskTime {
                name: "Buy milk".to_string()
            }
        );
        assert_eq!(turn.response.text, TIME_PROMPT);
        assert!(turn.effects.is_empty());
    }

    // Concrete scenario 1: the full add flow commits the parsed task.
    #[test]
    fn parsed_time_commits_task_and_hands_off_to_calendar() {
        let turn = transition(
            &ChatState::AwaitingTaskTime {
                name: "Buy milk".to_string(),
            },
            &ctx_with(vec![]),
            text("tomorrow at 15:00"),
        );

        let expected_at = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(
            turn.effects,
            vec![
                Effect::Commit {
                    task: Task::new("Buy milk", expected_at)
                },
                Effect::SyncCalendar {
                    summary: "Buy milk".to_string(),
                    start: expected_at
                },
            ]
        );
        assert_eq!(
            turn.response.text,
            "Task 'Buy milk' scheduled for 2024-01-02 15:00!"
        );
        assert_eq!(turn.response.menu, root_menu());
    }

    // Concrete scenario 4: gibberish commits nothing and stays put.
    #[test]
    fn unparseable_time_reprompts_without_effects() {
        let state = ChatState::AwaitingTaskTime {
            name: "Buy milk".to_string(),
        };
        let turn = transition(&state, &ctx_with(vec![]), text("gibberish"));

        assert_eq!(turn.next, state);
        assert_eq!(turn.response.text, TIME_REPROMPT);
        assert!(turn.effects.is_empty());
    }

    #[test]
    fn delete_with_no_tasks_is_informational() {
        let turn = transition(
            &ChatState::Idle,
            &ctx_with(vec![]),
            select(MenuAction::Delete),
        );
        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(turn.response.text, NO_TASKS);
        assert_eq!(turn.response.menu, root_menu());
    }

    #[test]
    fn delete_renders_selection_menu_with_snapshot() {
        let tasks = vec![task("A"), task("B"), task("C")];
        let turn = transition(
            &ChatState::Idle,
            &ctx_with(tasks.clone()),
            select(MenuAction::Delete),
        );

        assert_eq!(
            turn.next,
            ChatState::AwaitingDeleteSelection {
                offered: vec!["A".to_string(), "B".to_string(), "C".to_string()]
            }
        );
        assert_eq!(turn.response.text, PICK_DELETE);
        assert_eq!(turn.response.menu, delete_menu(&tasks));
    }

    // Concrete scenario 2: selecting index 1 of ["A","B","C"] removes "B".
    #[test]
    fn valid_delete_selection_removes_that_task() {
        let state = ChatState::AwaitingDeleteSelection {
            offered: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        };
        let turn = transition(
            &state,
            &ctx_with(vec![task("A"), task("B"), task("C")]),
            Event::IndexSelect { index: 1 },
        );

        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(turn.effects, vec![Effect::Remove { index: 1 }]);
        assert_eq!(turn.response.text, "Task 'B' deleted!");
        assert_eq!(turn.response.menu, root_menu());
    }

    // Concrete scenario 3: an index that was never offered is a user error.
    #[test]
    fn out_of_range_delete_selection_is_rejected() {
        let state = ChatState::AwaitingDeleteSelection {
            offered: vec!["A".to_string(), "C".to_string()],
        };
        let turn = transition(
            &state,
            &ctx_with(vec![task("A"), task("C")]),
            Event::IndexSelect { index: 5 },
        );

        assert_eq!(turn.next, ChatState::Idle);
        assert!(turn.effects.is_empty());
        assert_eq!(turn.response.text, INVALID_INDEX);
        assert_eq!(turn.response.menu, root_menu());
    }

    #[test]
    fn stale_delete_selection_rerenders_instead_of_removing() {
        // Menu showed ["A", "B"], but "A" was removed before confirmation:
        // index 1 now points at a different task.
        let state = ChatState::AwaitingDeleteSelection {
            offered: vec!["A".to_string(), "B".to_string()],
        };
        let turn = transition(
            &state,
            &ctx_with(vec![task("B")]),
            Event::IndexSelect { index: 1 },
        );

        assert_eq!(
            turn.next,
            ChatState::AwaitingDeleteSelection {
                offered: vec!["B".to_string()]
            }
        );
        assert!(turn.effects.is_empty());
        assert_eq!(turn.response.text, LIST_CHANGED);
    }

    #[test]
    fn stale_delete_selection_against_emptied_list_returns_to_root() {
        let state = ChatState::AwaitingDeleteSelection {
            offered: vec!["A".to_string()],
        };
        let turn = transition(&state, &ctx_with(vec![]), Event::IndexSelect { index: 0 });

        assert_eq!(turn.next, ChatState::Idle);
        assert!(turn.effects.is_empty());
        assert_eq!(turn.response.text, NO_TASKS);
    }

    #[test]
    fn list_renders_numbered_tasks() {
        let turn = transition(
            &ChatState::Idle,
            &ctx_with(vec![task("A"), task("B")]),
            select(MenuAction::List),
        );
        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(
            turn.response.text,
            "Your tasks:\n1. A - 2024-01-02 09:00\n2. B - 2024-01-02 09:00"
        );
        assert_eq!(turn.response.menu, root_menu());
    }

    #[test]
    fn list_with_no_tasks_is_informational() {
        let turn = transition(&ChatState::Idle, &ctx_with(vec![]), select(MenuAction::List));
        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(turn.response.text, NO_TASKS);
    }

    #[test]
    fn menu_fallback_discards_pending_flow_data() {
        let state = ChatState::AwaitingTaskTime {
            name: "half-entered".to_string(),
        };
        let turn = transition(&state, &ctx_with(vec![]), select(MenuAction::Menu));

        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(turn.response.text, PICK_ACTION);
        assert!(turn.effects.is_empty());
    }

    #[test]
    fn unknown_tag_leaves_state_unchanged() {
        let state = ChatState::AwaitingTaskTime {
            name: "pending".to_string(),
        };
        let turn = transition(
            &state,
            &ctx_with(vec![]),
            Event::Unknown {
                tag: "reboot".to_string(),
            },
        );

        assert_eq!(turn.next, state);
        assert_eq!(turn.response.text, UNKNOWN_ACTION);
        assert_eq!(turn.response.menu, root_menu());
        assert!(turn.effects.is_empty());
    }

    #[test]
    fn mismatched_events_degrade_to_root_menu() {
        // Typed text while idle, index selection while naming: no use for
        // either, state stays put.
        let turn = transition(&ChatState::Idle, &ctx_with(vec![]), text("hello"));
        assert_eq!(turn.next, ChatState::Idle);
        assert_eq!(turn.response.text, UNKNOWN_ACTION);

        let turn = transition(
            &ChatState::AwaitingTaskName,
            &ctx_with(vec![]),
            Event::IndexSelect { index: 0 },
        );
        assert_eq!(turn.next, ChatState::AwaitingTaskName);
        assert_eq!(turn.response.text, UNKNOWN_ACTION);
    }
}
