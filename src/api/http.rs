//! HTTP client for the board API.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult, BoardGateway, CreateListBody, OrderBody, TitleBody};
use crate::models::{BoardList, ListId, ListPatch, Task, TaskId, TaskPatch};

/// Pulls a readable message out of an error body.
///
/// Tries `error`, then `message`, then falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

fn trim_base(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// `base_url` is the absolute API root, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_base(base_url.into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = match extract_error_message(&body) {
            m if m.is_empty() => status.canonical_reason().unwrap_or("request failed").to_string(),
            m => m,
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self
            .send(request)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// For calls answered with 204 or an ignorable body
    async fn execute(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl BoardGateway for HttpGateway {
    async fn list_all_tasks(&self) -> ApiResult<Vec<Task>> {
        self.fetch(self.client.get(self.url("/todos"))).await
    }

    async fn list_tasks(&self, list_id: ListId) -> ApiResult<Vec<Task>> {
        self.fetch(self.client.get(self.url(&format!("/lists/{}/todos", list_id)))).await
    }

    async fn create_task(&self, list_id: ListId, title: &str) -> ApiResult<Task> {
        let request = self
            .client
            .post(self.url(&format!("/lists/{}/todos", list_id)))
            .json(&TitleBody { title });
        self.fetch(request).await
    }

    async fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        let request = self.client.patch(self.url(&format!("/todos/{}", task_id))).json(patch);
        self.fetch(request).await
    }

    async fn delete_task(&self, task_id: TaskId) -> ApiResult<()> {
        self.execute(self.client.delete(self.url(&format!("/todos/{}", task_id)))).await
    }

    async fn set_task_order(&self, list_id: ListId, order: &[TaskId]) -> ApiResult<()> {
        debug!("set order of list {}: {:?}", list_id, order);
        let request = self
            .client
            .post(self.url(&format!("/lists/{}/todos/reorder", list_id)))
            .json(&OrderBody { order });
        self.execute(request).await
    }

    async fn list_lists(&self) -> ApiResult<Vec<BoardList>> {
        self.fetch(self.client.get(self.url("/lists"))).await
    }

    async fn create_list(&self, name: &str, color: &str) -> ApiResult<BoardList> {
        let request = self
            .client
            .post(self.url("/lists"))
            .json(&CreateListBody { name, color });
        self.fetch(request).await
    }

    async fn update_list(&self, list_id: ListId, patch: &ListPatch) -> ApiResult<BoardList> {
        let request = self.client.patch(self.url(&format!("/lists/{}", list_id))).json(patch);
        self.fetch(request).await
    }

    async fn delete_list(&self, list_id: ListId) -> ApiResult<()> {
        self.execute(self.client.delete(self.url(&format!("/lists/{}", list_id)))).await
    }

    async fn list_notepad(&self) -> ApiResult<Vec<Task>> {
        self.fetch(self.client.get(self.url("/notepad"))).await
    }

    async fn create_notepad_entry(&self, title: &str) -> ApiResult<Task> {
        let request = self.client.post(self.url("/notepad")).json(&TitleBody { title });
        self.fetch(request).await
    }
}
