use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

/// Column list shared by every query returning a `Task`.
pub(crate) const TASK_COLUMNS: &str = "id, title, description, completed, created_at, author_id";

/// Input structure for creating or replacing a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 50 characters.
    #[validate(length(min = 1, max = 50))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

/// A task row. Every task belongs to exactly one user through `author_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Filled in by the database (`DEFAULT now()`) on insert.
    pub created_at: DateTime<Utc>,
    /// Owning user's id.
    pub author_id: i32,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task(id={} title={} description={} completed={} created_at={})",
            self.id, self.title, self.description, self.completed, self.created_at
        )
    }
}

/// Query parameters for listing the caller's tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Only tasks whose `completed` flag matches.
    pub completed: Option<bool>,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
}
