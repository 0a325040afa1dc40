//! Task model definitions
//!
//! A task exists in three shapes: the domain [`Task`] handed to screens, the
//! persisted [`LocalTask`] row, and the [`NetworkTask`] record exchanged with
//! the remote service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item as seen by the rest of the application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

impl Task {
    /// Create a new active task with a freshly generated id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            is_completed: false,
        }
    }

    /// Set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the completion flag
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.is_completed
    }

    /// Label for list rows: the title, or the description when untitled
    pub fn title_for_list(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() || self.description.is_empty()
    }
}

/// Persisted representation of a task in the local store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

/// Status of a task on the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkTaskStatus {
    Active,
    Complete,
}

impl Default for NetworkTaskStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Record exchanged with the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTask {
    pub id: String,
    pub title: String,
    pub short_description: String,
    #[serde(default)]
    pub status: NetworkTaskStatus,
}

impl NetworkTask {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        short_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            short_description: short_description.into(),
            status: NetworkTaskStatus::Active,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == NetworkTaskStatus::Complete
    }
}
