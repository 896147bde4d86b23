//! Menu construction
//!
//! Pure mapping from conversational context to selectable controls. The
//! transport renders these as buttons and echoes the tag back on selection.

use crate::store::Task;

/// A selectable control: `label` is shown to the user, `tag` comes back in
/// the select callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub tag: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
        }
    }
}

/// One turn's outbound payload: text plus the controls to render with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub menu: Vec<MenuItem>,
}

impl Response {
    pub fn new(text: impl Into<String>, menu: Vec<MenuItem>) -> Self {
        Self {
            text: text.into(),
            menu,
        }
    }
}

/// Root menu: the three entry actions.
pub fn root_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("Add task", "add"),
        MenuItem::new("Delete task", "delete"),
        MenuItem::new("List tasks", "list"),
    ]
}

/// Escape hatch shown alongside intermediate prompts.
pub fn main_menu_link() -> Vec<MenuItem> {
    vec![MenuItem::new("Main menu", "menu")]
}

/// One entry per task, in list order: label "1. name", tag "0".
pub fn delete_menu(tasks: &[Task]) -> Vec<MenuItem> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| MenuItem::new(format!("{}. {}", i + 1, task.name), i.to_string()))
        .collect()
}
