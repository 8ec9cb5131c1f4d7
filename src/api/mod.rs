//! Remote Board API
//!
//! The REST surface the board talks to (`/api/todos`, `/api/lists`,
//! `/api/lists/:id/todos`, `/api/notepad`), behind a trait so the
//! reconciler can be driven by an in-memory double in tests.

mod http;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{BoardList, ListId, ListPatch, Task, TaskId, TaskPatch};

pub use http::HttpGateway;

pub type ApiResult<T> = Result<T, ApiError>;

/// Any failed remote call. The core only distinguishes success from failure;
/// the variants exist for logs and notices.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

// ========================
// Request Bodies
// ========================

#[derive(Serialize)]
pub(crate) struct TitleBody<'a> {
    pub title: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CreateListBody<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

#[derive(Serialize)]
pub(crate) struct OrderBody<'a> {
    pub order: &'a [TaskId],
}

/// Remote persistence for lists, tasks and the notepad
#[async_trait(?Send)]
pub trait BoardGateway {
    async fn list_all_tasks(&self) -> ApiResult<Vec<Task>>;

    async fn list_tasks(&self, list_id: ListId) -> ApiResult<Vec<Task>>;

    /// The server inserts new tasks at the top of the list
    async fn create_task(&self, list_id: ListId, title: &str) -> ApiResult<Task>;

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> ApiResult<Task>;

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()>;

    /// Persists a list's full task order
    async fn set_task_order(&self, list_id: ListId, order: &[TaskId]) -> ApiResult<()>;

    async fn list_lists(&self) -> ApiResult<Vec<BoardList>>;

    async fn create_list(&self, name: &str, color: &str) -> ApiResult<BoardList>;

    async fn update_list(&self, list_id: ListId, patch: &ListPatch) -> ApiResult<BoardList>;

    /// Deletes the list and every task in it
    async fn delete_list(&self, list_id: ListId) -> ApiResult<()>;

    async fn list_notepad(&self) -> ApiResult<Vec<Task>>;

    async fn create_notepad_entry(&self, title: &str) -> ApiResult<Task>;

    // Notepad entries are ordinary tasks server-side
    async fn update_notepad_entry(&self, task_id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        self.update_task(task_id, patch).await
    }

    async fn delete_notepad_entry(&self, task_id: TaskId) -> ApiResult<()> {
        self.delete_task(task_id).await
    }
}
