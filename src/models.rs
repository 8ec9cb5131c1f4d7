//! Frontend Models
//!
//! Data structures matching the board API entities.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = u32;
pub type ListId = u32;

/// A task card (`/api/todos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub done: bool,
    /// `None` while the task lives in the notepad
    #[serde(default)]
    pub list_id: Option<ListId>,
    #[serde(default)]
    pub position: i32,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// A board column (`/api/lists`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// The sequence that owns a task: a list, or the notepad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Container {
    List(ListId),
    Notepad,
}

impl Container {
    pub fn list_id(self) -> Option<ListId> {
        match self {
            Container::List(id) => Some(id),
            Container::Notepad => None,
        }
    }
}

/// Partial task update (`PATCH /api/todos/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ListId>,
}

/// Partial list update (`PATCH /api/lists/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// The server stores `done` as an INTEGER column.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(n) => n != 0,
        Raw::Null(()) => false,
    })
}

/// Parses SQLite `CURRENT_TIMESTAMP` text, falling back to RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
