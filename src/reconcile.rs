//! Persistence Reconciler
//!
//! Persists a finished drag ([`Commit`]) and keeps the local board from
//! drifting away from the server:
//!
//! - column and within-list reorders are repaired by refetching on failure
//! - a failed membership change (list to list, notepad to list) is undone
//!   locally with the commit's [`Reversal`](crate::board::Reversal)
//! - a failed order call after a successful membership change is only
//!   reported; the task stays where the user put it

use std::cell::RefCell;

use futures::future::join_all;
use log::{error, info, warn};

use crate::api::{ApiError, BoardGateway};
use crate::board::BoardState;
use crate::drag_session::Commit;
use crate::models::{Container, ListId, ListPatch, Task, TaskId, TaskPatch};

/// Shared access to the board from async code.
///
/// Implementations must not hold a borrow across an `.await`; every call
/// is a short synchronous read or write.
pub trait BoardCell {
    fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R;
    fn write(&self, f: impl FnOnce(&mut BoardState));
}

impl BoardCell for RefCell<BoardState> {
    fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.borrow())
    }

    fn write(&self, f: impl FnOnce(&mut BoardState)) {
        f(&mut self.borrow_mut())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every call succeeded
    Persisted,
    /// Membership was saved but an order or cleanup call failed; the server
    /// order may differ until the next load
    OrderStale,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    #[error("Move could not be saved and was undone ({0})")]
    RolledBack(ApiError),
    #[error("Order could not be saved; reloaded from server ({0})")]
    Refreshed(ApiError),
    #[error("Order could not be saved and the board could not be reloaded ({0})")]
    RefreshFailed(ApiError),
}

/// Persists one commit. Local state is rolled back or refreshed before an
/// error is returned.
pub async fn reconcile<G, B>(gateway: &G, board: &B, commit: Commit) -> Result<CommitOutcome, ReconcileError>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    info!("committing {:?}", commit);
    match commit {
        Commit::Columns { order } => commit_columns(gateway, board, order).await,
        Commit::WithinList { list_id, order } => commit_list_order(gateway, board, list_id, order).await,
        Commit::AcrossLists { .. } | Commit::FromNotepad { .. } => commit_move(gateway, board, commit).await,
    }
}

async fn commit_columns<G, B>(gateway: &G, board: &B, order: Vec<ListId>) -> Result<CommitOutcome, ReconcileError>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    board.write(|b| b.renumber_positions());

    let patches: Vec<(ListId, ListPatch)> = order
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let patch = ListPatch {
                position: Some(i as i32),
                ..Default::default()
            };
            (*id, patch)
        })
        .collect();
    let results = join_all(patches.iter().map(|(id, patch)| gateway.update_list(*id, patch))).await;

    match results.into_iter().find_map(Result::err) {
        None => Ok(CommitOutcome::Persisted),
        Some(err) => {
            warn!("column order not saved: {}", err);
            match gateway.list_lists().await {
                Ok(lists) => {
                    board.write(|b| b.apply_lists_snapshot(lists));
                    Err(ReconcileError::Refreshed(err))
                }
                Err(refetch) => {
                    error!("reloading lists failed: {}", refetch);
                    Err(ReconcileError::RefreshFailed(err))
                }
            }
        }
    }
}

async fn commit_list_order<G, B>(
    gateway: &G,
    board: &B,
    list_id: ListId,
    order: Vec<TaskId>,
) -> Result<CommitOutcome, ReconcileError>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let Err(err) = gateway.set_task_order(list_id, &order).await else {
        return Ok(CommitOutcome::Persisted);
    };
    warn!("order of list {} not saved: {}", list_id, err);
    match gateway.list_tasks(list_id).await {
        Ok(tasks) => {
            board.write(|b| {
                b.apply_list_snapshot(list_id, tasks);
            });
            Err(ReconcileError::Refreshed(err))
        }
        Err(refetch) => {
            error!("reloading list {} failed: {}", list_id, refetch);
            Err(ReconcileError::RefreshFailed(err))
        }
    }
}

async fn commit_move<G, B>(gateway: &G, board: &B, commit: Commit) -> Result<CommitOutcome, ReconcileError>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let Some(reversal) = commit.reversal() else {
        return Ok(CommitOutcome::Persisted);
    };
    let rollback = |err: ApiError| {
        let mut undone = false;
        board.write(|b| undone = b.revert(reversal));
        if undone {
            warn!("move not saved, undone: {}", err);
        } else {
            warn!("move not saved and the item is no longer on the board: {}", err);
        }
        ReconcileError::RolledBack(err)
    };

    match commit {
        Commit::AcrossLists { task_id, from, to, .. } => {
            let patch = TaskPatch {
                list_id: Some(to),
                ..Default::default()
            };
            let updated = gateway.update_task(task_id, &patch).await.map_err(rollback)?;
            board.write(|b| {
                b.replace_task(updated);
            });

            let (to_order, from_order) =
                board.read(|b| (b.order(Container::List(to)), b.order(Container::List(from))));
            let (to_saved, from_saved) = futures::join!(
                gateway.set_task_order(to, &to_order),
                gateway.set_task_order(from, &from_order),
            );
            Ok(stale_if_failed([to_saved, from_saved]))
        }
        Commit::FromNotepad { entry, to, .. } => {
            let created = gateway.create_task(to, &entry.title).await.map_err(rollback)?;
            let created_id = created.id;
            board.write(|b| {
                if !b.replace_task_id(entry.id, created.clone()) {
                    // Placeholder is gone (list deleted meanwhile?); keep the new card visible if possible
                    b.insert_task(Container::List(to), 0, created);
                }
            });

            // Order must include the id the server just assigned
            let to_order = board.read(|b| b.order(Container::List(to)));
            let order_saved = gateway.set_task_order(to, &to_order).await;
            let cleanup = gateway.delete_notepad_entry(entry.id).await;
            info!("notepad entry {} became task {}", entry.id, created_id);
            Ok(stale_if_failed([order_saved, cleanup]))
        }
        Commit::Columns { .. } | Commit::WithinList { .. } => Ok(CommitOutcome::Persisted),
    }
}

fn stale_if_failed<const N: usize>(results: [Result<(), ApiError>; N]) -> CommitOutcome {
    let failures: Vec<ApiError> = results.into_iter().filter_map(Result::err).collect();
    if failures.is_empty() {
        CommitOutcome::Persisted
    } else {
        for err in &failures {
            warn!("move saved but follow-up call failed: {}", err);
        }
        CommitOutcome::OrderStale
    }
}

/// Title of the task a commit moves, for notices
pub fn moved_title(commit: &Commit, board: &BoardState) -> Option<String> {
    let task: Option<&Task> = match commit {
        Commit::AcrossLists { task_id, .. } => board.task(*task_id),
        Commit::FromNotepad { entry, .. } => Some(entry),
        _ => None,
    };
    task.map(|t| t.title.clone())
}
