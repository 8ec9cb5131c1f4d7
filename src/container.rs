//! Container Addressing
//!
//! Maps containers and draggable things to the string ids carried through
//! the DOM (`list-3`, `notepad`, `col-3`, `todo-12`) and back.

use std::fmt;

use crate::board::BoardState;
use crate::models::{Container, ListId, TaskId};

/// Reserved container id of the notepad
pub const NOTEPAD_CONTAINER_ID: &str = "notepad";

/// DOM attribute holding a drag target id
pub const DRAG_ID_ATTR: &str = "data-drag-id";

const LIST_PREFIX: &str = "list-";
const COLUMN_PREFIX: &str = "col-";
const TASK_PREFIX: &str = "todo-";

pub fn container_id_for_list(list_id: ListId) -> String {
    format!("{}{}", LIST_PREFIX, list_id)
}

pub fn container_id(container: Container) -> String {
    match container {
        Container::List(id) => container_id_for_list(id),
        Container::Notepad => NOTEPAD_CONTAINER_ID.to_string(),
    }
}

/// Decodes a container id. `None` means malformed: ignore the event.
pub fn parse_container_id(raw: &str) -> Option<Container> {
    if raw == NOTEPAD_CONTAINER_ID {
        return Some(Container::Notepad);
    }
    parse_numeric(raw, LIST_PREFIX).map(Container::List)
}

/// Finds the container currently holding `task_id`.
pub fn resolve_container_for_item(task_id: TaskId, board: &BoardState) -> Option<Container> {
    board.container_of(task_id)
}

// Digits only, so `list-+3` or `list-03x` are rejected
fn parse_numeric(raw: &str, prefix: &str) -> Option<u32> {
    let digits = raw.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Something that can be dragged, or hovered while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragTarget {
    /// A whole column, grabbed by its header
    Column(ListId),
    /// A single task card
    Task(TaskId),
    /// The body of a container (empty space below its cards)
    Body(Container),
}

impl DragTarget {
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(id) = parse_numeric(raw, COLUMN_PREFIX) {
            return Some(DragTarget::Column(id));
        }
        if let Some(id) = parse_numeric(raw, TASK_PREFIX) {
            return Some(DragTarget::Task(id));
        }
        parse_container_id(raw).map(DragTarget::Body)
    }
}

impl fmt::Display for DragTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragTarget::Column(id) => write!(f, "{}{}", COLUMN_PREFIX, id),
            DragTarget::Task(id) => write!(f, "{}{}", TASK_PREFIX, id),
            DragTarget::Body(container) => f.write_str(&container_id(*container)),
        }
    }
}
