//! Board Actions
//!
//! Everything the user does to the board besides dragging: loading, task
//! and notepad edits, list management. Each action waits for the server and
//! then applies the confirmed entity locally.

use log::{info, warn};

use crate::api::{ApiError, BoardGateway};
use crate::board::BoardState;
use crate::models::{BoardList, Container, ListId, ListPatch, Task, TaskId, TaskPatch};
use crate::reconcile::BoardCell;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("List name cannot be empty")]
    EmptyName,
    #[error("List {0} no longer exists")]
    UnknownList(ListId),
    #[error("Task {0} no longer exists")]
    UnknownTask(TaskId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ActionResult<T> = Result<T, ActionError>;

fn non_empty(raw: &str, err: ActionError) -> ActionResult<&str> {
    match raw.trim() {
        "" => Err(err),
        trimmed => Ok(trimmed),
    }
}

/// Fetches lists, tasks and the notepad in one go.
pub async fn load_board<G: BoardGateway + ?Sized>(gateway: &G) -> ActionResult<BoardState> {
    let (lists, tasks, notepad) = futures::join!(
        gateway.list_lists(),
        gateway.list_all_tasks(),
        gateway.list_notepad(),
    );
    let board = BoardState::from_parts(lists?, tasks?, notepad?);
    info!(
        "loaded {} lists, {} tasks",
        board.lists().len(),
        board.task_ids().len()
    );
    Ok(board)
}

/// Re-reads the notepad only
pub async fn refresh_notepad<G, B>(gateway: &G, board: &B) -> ActionResult<()>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let entries = gateway.list_notepad().await?;
    board.write(|b| b.apply_notepad_snapshot(entries));
    Ok(())
}

// ========================
// Tasks
// ========================

/// Adds a task at the top of a list.
pub async fn add_task<G, B>(gateway: &G, board: &B, list_id: ListId, title: &str) -> ActionResult<Task>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let title = non_empty(title, ActionError::EmptyTitle)?;
    if !board.read(|b| b.has_container(Container::List(list_id))) {
        return Err(ActionError::UnknownList(list_id));
    }
    let created = gateway.create_task(list_id, title).await?;
    board.write(|b| {
        b.insert_task(Container::List(list_id), 0, created.clone());
    });
    Ok(created)
}

pub async fn add_notepad_entry<G, B>(gateway: &G, board: &B, title: &str) -> ActionResult<Task>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let title = non_empty(title, ActionError::EmptyTitle)?;
    let created = gateway.create_notepad_entry(title).await?;
    board.write(|b| {
        b.insert_task(Container::Notepad, 0, created.clone());
    });
    Ok(created)
}

/// Sends `patch` to whichever endpoint owns the task and stores the result.
async fn patch_task<G, B>(gateway: &G, board: &B, task_id: TaskId, patch: TaskPatch) -> ActionResult<Task>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let container = board
        .read(|b| b.container_of(task_id))
        .ok_or(ActionError::UnknownTask(task_id))?;
    let updated = match container {
        Container::List(_) => gateway.update_task(task_id, &patch).await?,
        Container::Notepad => gateway.update_notepad_entry(task_id, &patch).await?,
    };
    board.write(|b| {
        b.replace_task(updated.clone());
    });
    Ok(updated)
}

pub async fn toggle_done<G, B>(gateway: &G, board: &B, task_id: TaskId) -> ActionResult<Task>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let done = board
        .read(|b| b.task(task_id).map(|t| t.done))
        .ok_or(ActionError::UnknownTask(task_id))?;
    let patch = TaskPatch {
        done: Some(!done),
        ..Default::default()
    };
    patch_task(gateway, board, task_id, patch).await
}

/// Renames a task. Returns `false` without calling the server when the
/// trimmed title is empty or unchanged.
pub async fn edit_task_title<G, B>(gateway: &G, board: &B, task_id: TaskId, title: &str) -> ActionResult<bool>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let title = title.trim();
    let current = board
        .read(|b| b.task(task_id).map(|t| t.title.clone()))
        .ok_or(ActionError::UnknownTask(task_id))?;
    if title.is_empty() || title == current {
        return Ok(false);
    }
    let patch = TaskPatch {
        title: Some(title.to_string()),
        ..Default::default()
    };
    patch_task(gateway, board, task_id, patch).await?;
    Ok(true)
}

/// Deletes a task or notepad entry.
pub async fn delete_task<G, B>(gateway: &G, board: &B, task_id: TaskId) -> ActionResult<()>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let container = board
        .read(|b| b.container_of(task_id))
        .ok_or(ActionError::UnknownTask(task_id))?;
    match container {
        Container::List(_) => gateway.delete_task(task_id).await?,
        Container::Notepad => gateway.delete_notepad_entry(task_id).await?,
    }
    board.write(|b| {
        b.remove_task(task_id);
    });
    Ok(())
}

// ========================
// Lists
// ========================

/// Creates a list as the rightmost column.
///
/// The server puts new lists at position 0, so a second call moves it after
/// the current last column. If that call fails the list is kept where the
/// server put it.
pub async fn create_list<G, B>(gateway: &G, board: &B, name: &str, color: &str) -> ActionResult<BoardList>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let name = non_empty(name, ActionError::EmptyName)?;
    let mut created = gateway.create_list(name, color).await?;

    let position = board.read(|b| b.lists().iter().map(|l| l.position).max().map_or(0, |p| p + 1));
    let patch = ListPatch {
        position: Some(position),
        ..Default::default()
    };
    match gateway.update_list(created.id, &patch).await {
        Ok(updated) => created = updated,
        Err(err) => warn!("list {} stays at position {}: {}", created.id, created.position, err),
    }

    board.write(|b| b.upsert_list(created.clone()));
    Ok(created)
}

async fn patch_list<G, B>(gateway: &G, board: &B, list_id: ListId, patch: ListPatch) -> ActionResult<BoardList>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    if board.read(|b| b.list(list_id).is_none()) {
        return Err(ActionError::UnknownList(list_id));
    }
    let updated = gateway.update_list(list_id, &patch).await?;
    board.write(|b| b.upsert_list(updated.clone()));
    Ok(updated)
}

/// Renames a list; `false` when the trimmed name is unchanged.
pub async fn rename_list<G, B>(gateway: &G, board: &B, list_id: ListId, name: &str) -> ActionResult<bool>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let name = non_empty(name, ActionError::EmptyName)?;
    if board.read(|b| b.list(list_id).is_some_and(|l| l.name == name)) {
        return Ok(false);
    }
    let patch = ListPatch {
        name: Some(name.to_string()),
        ..Default::default()
    };
    patch_list(gateway, board, list_id, patch).await?;
    Ok(true)
}

pub async fn recolor_list<G, B>(gateway: &G, board: &B, list_id: ListId, color: &str) -> ActionResult<BoardList>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    let patch = ListPatch {
        color: Some(color.to_string()),
        ..Default::default()
    };
    patch_list(gateway, board, list_id, patch).await
}

/// Deletes a list together with its tasks.
pub async fn delete_list<G, B>(gateway: &G, board: &B, list_id: ListId) -> ActionResult<()>
where
    G: BoardGateway + ?Sized,
    B: BoardCell + ?Sized,
{
    gateway.delete_list(list_id).await?;
    board.write(|b| {
        b.remove_list(list_id);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::api::mock::{Call, MockGateway};
    use crate::board::tests::{assert_consistent, list, task};

    fn seeded() -> MockGateway {
        MockGateway::new(
            vec![list(1, 0), list(2, 1)],
            vec![task(1, Some(1)), task(2, Some(1)), task(4, Some(2))],
            vec![task(9, None)],
        )
    }

    async fn loaded(gateway: &MockGateway) -> RefCell<BoardState> {
        let board = load_board(gateway).await.unwrap();
        gateway.clear_calls();
        RefCell::new(board)
    }

    #[tokio::test]
    async fn test_load_board() {
        let gateway = seeded();
        let board = loaded(&gateway).await;
        let b = board.borrow();

        assert_eq!(b.list_order(), vec![1, 2]);
        assert_eq!(b.order(Container::List(1)), vec![1, 2]);
        assert_eq!(b.order(Container::List(2)), vec![4]);
        assert_eq!(b.order(Container::Notepad), vec![9]);
        assert_consistent(&b);
    }

    #[tokio::test]
    async fn test_load_board_fails_as_a_whole() {
        let gateway = seeded();
        gateway.fail("list_notepad");
        assert!(matches!(load_board(&gateway).await, Err(ActionError::Api(_))));
    }

    #[tokio::test]
    async fn test_add_task_goes_to_top_trimmed() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        let created = add_task(&gateway, &board, 1, "  write report ").await.unwrap();
        assert_eq!(created.title, "write report");
        assert_eq!(board.borrow().order(Container::List(1)), vec![created.id, 1, 2]);
        assert_eq!(gateway.order(1), vec![created.id, 1, 2]);
    }

    #[tokio::test]
    async fn test_add_task_rejects_blank_and_unknown_list() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        assert_eq!(add_task(&gateway, &board, 1, "   ").await, Err(ActionError::EmptyTitle));
        assert_eq!(add_task(&gateway, &board, 77, "x").await, Err(ActionError::UnknownList(77)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_leaves_board_alone() {
        let gateway = seeded();
        let board = loaded(&gateway).await;
        let before = board.borrow().clone();
        gateway.fail("create_task");

        assert!(add_task(&gateway, &board, 1, "x").await.is_err());
        assert_eq!(*board.borrow(), before);
    }

    #[tokio::test]
    async fn test_notepad_entries() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        let entry = add_notepad_entry(&gateway, &board, "idea").await.unwrap();
        assert_eq!(board.borrow().order(Container::Notepad), vec![entry.id, 9]);

        assert!(edit_task_title(&gateway, &board, entry.id, "better idea").await.unwrap());
        assert_eq!(board.borrow().task(entry.id).unwrap().title, "better idea");

        delete_task(&gateway, &board, 9).await.unwrap();
        assert_eq!(board.borrow().order(Container::Notepad), vec![entry.id]);
        assert_eq!(gateway.notepad_ids(), vec![entry.id]);
    }

    #[tokio::test]
    async fn test_toggle_done() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        let updated = toggle_done(&gateway, &board, 2).await.unwrap();
        assert!(updated.done);
        assert!(board.borrow().task(2).unwrap().done);
        assert_eq!(
            gateway.calls(),
            vec![Call::UpdateTask(2, TaskPatch { done: Some(true), ..Default::default() })]
        );
        assert_eq!(toggle_done(&gateway, &board, 404).await, Err(ActionError::UnknownTask(404)));
    }

    #[tokio::test]
    async fn test_edit_title_skips_noop_edits() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        assert!(!edit_task_title(&gateway, &board, 1, "Task 1 ").await.unwrap());
        assert!(!edit_task_title(&gateway, &board, 1, "  ").await.unwrap());
        assert!(gateway.calls().is_empty());

        assert!(edit_task_title(&gateway, &board, 1, " renamed ").await.unwrap());
        assert_eq!(board.borrow().task(1).unwrap().title, "renamed");
        assert_eq!(board.borrow().container_of(1), Some(Container::List(1)));
    }

    #[tokio::test]
    async fn test_create_list_lands_at_the_end() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        let created = create_list(&gateway, &board, " Later ", "#fffbe6").await.unwrap();
        assert_eq!(created.name, "Later");
        assert_eq!(created.position, 2);
        assert_eq!(board.borrow().list_order(), vec![1, 2, created.id]);
        assert!(board.borrow().list_tasks(created.id).is_empty());

        let calls = gateway.calls();
        assert_eq!(calls[0], Call::CreateList("Later".into(), "#fffbe6".into()));
        assert_eq!(
            calls[1],
            Call::UpdateList(created.id, ListPatch { position: Some(2), ..Default::default() })
        );
        assert_consistent(&board.borrow());
    }

    #[tokio::test]
    async fn test_create_list_survives_failed_position_update() {
        let gateway = seeded();
        let board = loaded(&gateway).await;
        gateway.fail("update_list");

        let created = create_list(&gateway, &board, "First", "#fff").await.unwrap();
        assert_eq!(created.position, 0);
        assert!(board.borrow().list(created.id).is_some());
        assert_eq!(create_list(&gateway, &board, "", "#fff").await, Err(ActionError::EmptyName));
    }

    #[tokio::test]
    async fn test_rename_and_recolor_list() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        assert!(!rename_list(&gateway, &board, 1, "List 1").await.unwrap());
        assert!(rename_list(&gateway, &board, 1, "Doing").await.unwrap());
        recolor_list(&gateway, &board, 1, "#ff0000").await.unwrap();

        let b = board.borrow();
        let l = b.list(1).unwrap();
        assert_eq!((l.name.as_str(), l.color.as_deref()), ("Doing", Some("#ff0000")));
        assert_eq!(b.list_order(), vec![1, 2]);
        drop(b);
        assert_eq!(
            recolor_list(&gateway, &board, 77, "#000").await,
            Err(ActionError::UnknownList(77))
        );
    }

    #[tokio::test]
    async fn test_delete_list_cascades() {
        let gateway = seeded();
        let board = loaded(&gateway).await;

        delete_list(&gateway, &board, 1).await.unwrap();
        let b = board.borrow();
        assert_eq!(b.list_order(), vec![2]);
        assert_eq!(b.container_of(1), None);
        assert_eq!(b.container_of(2), None);
        assert!(gateway.order(1).is_empty());
        assert_consistent(&b);
    }

    #[tokio::test]
    async fn test_refresh_notepad() {
        let gateway = seeded();
        let board = loaded(&gateway).await;
        board.borrow_mut().remove_task(9);

        refresh_notepad(&gateway, &board).await.unwrap();
        assert_eq!(board.borrow().order(Container::Notepad), vec![9]);
    }
}
