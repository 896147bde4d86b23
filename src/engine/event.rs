//! Inbound events
//!
//! The transport delivers raw commands, typed text, and button callbacks;
//! `Event::from_tag` maps raw callback tags onto typed events in one place
//! so no string comparison leaks into the transitions.

/// Root-menu actions a user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Add,
    Delete,
    List,
    Menu,
}

impl MenuAction {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "add" => Some(MenuAction::Add),
            "delete" => Some(MenuAction::Delete),
            "list" => Some(MenuAction::List),
            "menu" => Some(MenuAction::Menu),
            _ => None,
        }
    }

    #[allow(dead_code)] // API completeness
    pub fn tag(self) -> &'static str {
        match self {
            MenuAction::Add => "add",
            MenuAction::Delete => "delete",
            MenuAction::List => "list",
            MenuAction::Menu => "menu",
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The start command
    Start,
    /// Button press on a known action
    Select { action: MenuAction },
    /// Free-typed message text
    Text { text: String },
    /// Button press on a deletion-menu entry (0-based index)
    IndexSelect { index: usize },
    /// Button press whose tag matched nothing known
    Unknown { tag: String },
}

impl Event {
    /// Map a raw transport callback tag onto a typed event.
    pub fn from_tag(tag: &str) -> Self {
        if let Some(action) = MenuAction::from_tag(tag) {
            return Event::Select { action };
        }
        if let Ok(index) = tag.parse::<usize>() {
            return Event::IndexSelect { index };
        }
        Event::Unknown {
            tag: tag.to_string(),
        }
    }

    /// Short tag for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Select { .. } => "select",
            Event::Text { .. } => "text",
            Event::IndexSelect { .. } => "index_select",
            Event::Unknown { .. } => "unknown",
        }
    }
}
