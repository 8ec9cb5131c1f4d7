//! Drag Session Tracker
//!
//! Turns the pointer sensor's lifecycle (start / over / release / cancel)
//! into board mutations. Hover moves are applied to the board right away so
//! the UI follows the pointer; the release produces a [`Commit`] describing
//! the net effect of the whole gesture, which the reconciler persists.
//!
//! Stale or unclassifiable targets are ignored, never reported.

use std::collections::HashSet;

use log::debug;

use crate::board::{BoardState, Reversal};
use crate::container::{resolve_container_for_item, DragTarget};
use crate::models::{Container, ListId, Task, TaskId};

/// Minimum spacing between applied hover reorders, per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    pub column_ms: f64,
    pub row_ms: f64,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            column_ms: 140.0,
            row_ms: 90.0,
        }
    }
}

/// A classified hover, already applied to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverAction {
    ColumnReorder { list_id: ListId, from: usize, to: usize },
    WithinList { list_id: ListId, from: usize, to: usize },
    AcrossContainers { task_id: TaskId, from: Container, to: Container, insert_at: usize },
}

impl HoverAction {
    fn apply(self, board: &mut BoardState) -> bool {
        match self {
            HoverAction::ColumnReorder { from, to, .. } => board.move_column(from, to),
            HoverAction::WithinList { list_id, from, to } => board.move_within_list(list_id, from, to),
            HoverAction::AcrossContainers { task_id, from, to, insert_at } => {
                board.move_across_containers(task_id, from, to, insert_at)
            }
        }
    }
}

/// Net result of a finished drag, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    /// Columns in their new left-to-right order
    Columns { order: Vec<ListId> },
    /// A list whose task order changed
    WithinList { list_id: ListId, order: Vec<TaskId> },
    /// A task moved from one list to another
    AcrossLists { task_id: TaskId, from: ListId, from_index: usize, to: ListId },
    /// A notepad entry dropped into a list; `entry.id` is its notepad id
    FromNotepad { entry: Task, notepad_index: usize, to: ListId },
}

impl Commit {
    /// The task whose membership this commit changes
    pub fn moved_task(&self) -> Option<TaskId> {
        match self {
            Commit::AcrossLists { task_id, .. } => Some(*task_id),
            Commit::FromNotepad { entry, .. } => Some(entry.id),
            Commit::Columns { .. } | Commit::WithinList { .. } => None,
        }
    }

    /// How to put the dragged item back if persisting fails. Reorders have
    /// none: they are repaired by refetching from the server.
    pub fn reversal(&self) -> Option<Reversal> {
        match self {
            Commit::Columns { .. } | Commit::WithinList { .. } => None,
            Commit::AcrossLists { task_id, from, from_index, .. } => Some(Reversal::Task {
                task_id: *task_id,
                container: Container::List(*from),
                index: *from_index,
            }),
            Commit::FromNotepad { entry, notepad_index, .. } => Some(Reversal::Task {
                task_id: entry.id,
                container: Container::Notepad,
                index: *notepad_index,
            }),
        }
    }
}

/// Where the dragged item was when the drag started
#[derive(Debug, Clone)]
enum Origin {
    Column { list_id: ListId, index: usize },
    Task { task: Task, container: Container, index: usize },
}

impl Origin {
    fn capture(active: DragTarget, board: &BoardState) -> Option<Self> {
        match active {
            DragTarget::Column(list_id) => Some(Origin::Column {
                list_id,
                index: board.column_index(list_id)?,
            }),
            DragTarget::Task(task_id) => {
                let container = resolve_container_for_item(task_id, board)?;
                Some(Origin::Task {
                    task: board.task(task_id)?.clone(),
                    container,
                    index: board.index_in(container, task_id)?,
                })
            }
            DragTarget::Body(_) => None,
        }
    }

    fn container(&self) -> Option<Container> {
        match self {
            Origin::Column { .. } => None,
            Origin::Task { container, .. } => Some(*container),
        }
    }

    fn reversal(&self) -> Reversal {
        match self {
            Origin::Column { list_id, index } => Reversal::Column { list_id: *list_id, index: *index },
            Origin::Task { task, container, index } => Reversal::Task {
                task_id: task.id,
                container: *container,
                index: *index,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct DragSession {
    active: DragTarget,
    origin: Origin,
    last_column_move: Option<f64>,
    last_row_move: Option<f64>,
    /// Target of the latest hover, if that hover was applied
    applied_over: Option<DragTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    throttle: Throttle,
    session: Option<DragSession>,
    /// Tasks whose move is still being saved. A notepad entry keeps its
    /// notepad id until the server assigns a new one, so it must stay put.
    in_flight: HashSet<TaskId>,
}

impl DragTracker {
    pub fn new(throttle: Throttle) -> Self {
        Self {
            throttle,
            session: None,
            in_flight: HashSet::new(),
        }
    }

    /// Begins a session. Ignored while another drag is active, when the
    /// item is not on the board, or while its last move is being saved.
    pub fn start(&mut self, active: DragTarget, board: &BoardState) -> bool {
        if self.session.is_some() {
            return false;
        }
        if let DragTarget::Task(task_id) = active {
            if self.in_flight.contains(&task_id) {
                debug!("{} is still being saved", active);
                return false;
            }
        }
        let Some(origin) = Origin::capture(active, board) else {
            debug!("ignoring drag start on {}", active);
            return false;
        };
        self.session = Some(DragSession {
            active,
            origin,
            last_column_move: None,
            last_row_move: None,
            applied_over: None,
        });
        true
    }

    /// Handles the pointer entering `over`; returns the move applied, if any.
    pub fn hover(&mut self, over: DragTarget, now_ms: f64, board: &mut BoardState) -> Option<HoverAction> {
        let throttle = self.throttle;
        let session = self.session.as_mut()?;
        session.applied_over = None;

        let action = classify(session.active, over, session.origin.container(), board)?;
        let (last, interval) = match action {
            HoverAction::ColumnReorder { .. } => (&mut session.last_column_move, Some(throttle.column_ms)),
            HoverAction::WithinList { .. } => (&mut session.last_row_move, Some(throttle.row_ms)),
            HoverAction::AcrossContainers { .. } => (&mut session.last_row_move, None),
        };
        if let (Some(prev), Some(interval)) = (*last, interval) {
            if now_ms - prev < interval {
                debug!("throttled {:?}", action);
                return None;
            }
        }
        if !action.apply(board) {
            return None;
        }
        if interval.is_some() {
            *last = Some(now_ms);
        }
        session.applied_over = Some(over);
        debug!("hover {} over {}: {:?}", session.active, over, action);
        Some(action)
    }

    /// Ends the session on pointer release.
    ///
    /// `over` is applied unthrottled unless the latest hover already applied
    /// it, so the result does not depend on how many hovers were dropped.
    /// The returned commit compares the item's origin with where it ended up.
    /// A moved task stays locked until [`settle`](Self::settle) is called
    /// with the commit.
    pub fn release(&mut self, over: Option<DragTarget>, board: &mut BoardState) -> Option<Commit> {
        let session = self.session.take()?;
        if let Some(over) = over {
            if session.applied_over != Some(over) {
                if let Some(action) = classify(session.active, over, session.origin.container(), board) {
                    action.apply(board);
                }
            }
        }
        let commit = net_commit(&session.origin, board)?;
        if let Some(task_id) = commit.moved_task() {
            self.in_flight.insert(task_id);
        }
        Some(commit)
    }

    /// Unlocks the task of a commit once persisting it has finished.
    pub fn settle(&mut self, commit: &Commit) {
        if let Some(task_id) = commit.moved_task() {
            self.in_flight.remove(&task_id);
        }
    }

    /// Abandons the session and puts the dragged item back where it started.
    pub fn cancel(&mut self, board: &mut BoardState) -> bool {
        match self.session.take() {
            Some(session) => board.revert(session.origin.reversal()),
            None => false,
        }
    }
}

fn classify(
    active: DragTarget,
    over: DragTarget,
    origin: Option<Container>,
    board: &BoardState,
) -> Option<HoverAction> {
    if active == over {
        return None;
    }
    match active {
        DragTarget::Column(list_id) => {
            // Cards and list bodies stand in for the column holding them
            let target = match over {
                DragTarget::Column(id) => id,
                DragTarget::Body(container) => container.list_id()?,
                DragTarget::Task(task_id) => resolve_container_for_item(task_id, board)?.list_id()?,
            };
            let from = board.column_index(list_id)?;
            let to = board.column_index(target)?;
            (from != to).then_some(HoverAction::ColumnReorder { list_id, from, to })
        }
        DragTarget::Task(task_id) => {
            let from = resolve_container_for_item(task_id, board)?;
            let to = match over {
                DragTarget::Task(over_id) => resolve_container_for_item(over_id, board)?,
                DragTarget::Body(container) => container,
                DragTarget::Column(id) => Container::List(id),
            };
            if !board.has_container(to) {
                return None;
            }

            if from == to {
                // Notepad order has no endpoint, so it is not reorderable
                let (DragTarget::Task(over_id), Container::List(list_id)) = (over, from) else {
                    return None;
                };
                let a = board.index_in(from, task_id)?;
                let b = board.index_in(from, over_id)?;
                return (a != b).then_some(HoverAction::WithinList { list_id, from: a, to: b });
            }

            // Only notepad entries may go (back) into the notepad
            if to == Container::Notepad && origin != Some(Container::Notepad) {
                return None;
            }
            let insert_at = match over {
                DragTarget::Task(over_id) => board.index_in(to, over_id).unwrap_or(0),
                _ => 0,
            };
            Some(HoverAction::AcrossContainers { task_id, from, to, insert_at })
        }
        DragTarget::Body(_) => None,
    }
}

fn net_commit(origin: &Origin, board: &mut BoardState) -> Option<Commit> {
    match origin {
        Origin::Column { list_id, index } => {
            let now = board.column_index(*list_id)?;
            (now != *index).then(|| Commit::Columns { order: board.list_order() })
        }
        Origin::Task { task, container, index } => {
            let current = resolve_container_for_item(task.id, board)?;
            let at = board.index_in(current, task.id)?;
            match (*container, current) {
                (Container::List(a), Container::List(b)) if a == b => (at != *index).then(|| Commit::WithinList {
                    list_id: a,
                    order: board.order(current),
                }),
                (Container::List(a), Container::List(b)) => Some(Commit::AcrossLists {
                    task_id: task.id,
                    from: a,
                    from_index: *index,
                    to: b,
                }),
                (Container::Notepad, Container::List(b)) => Some(Commit::FromNotepad {
                    entry: task.clone(),
                    notepad_index: *index,
                    to: b,
                }),
                (_, Container::Notepad) => {
                    // Nothing to persist; undo any visual shuffle
                    board.revert(origin.reversal());
                    None
                }
            }
        }
    }
}
