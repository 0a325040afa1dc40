//! Task data source traits
//!
//! Defines the interfaces the repository uses to reach the local table and the
//! remote service. Both are injected into the repository by the caller.

use async_trait::async_trait;
use tokio::sync::watch;

use super::model::{LocalTask, NetworkTask};
use crate::Result;

/// On-device task table
#[async_trait]
pub trait LocalTaskSource: Send + Sync {
    /// Get all tasks, ordered by id
    async fn get_all(&self) -> Result<Vec<LocalTask>>;

    /// Get a task by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<LocalTask>>;

    /// Insert a task, replacing any existing row with the same id
    async fn upsert(&self, task: LocalTask) -> Result<()>;

    /// Replace the whole table with `tasks` as a single change
    async fn replace_all(&self, tasks: Vec<LocalTask>) -> Result<()>;

    /// Set the completion flag. Returns false if the task does not exist.
    async fn update_completed(&self, id: &str, completed: bool) -> Result<bool>;

    /// Delete a task by ID. Returns false if the task did not exist.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Delete every completed task, returning how many were removed
    async fn delete_completed(&self) -> Result<usize>;

    /// Delete all tasks
    async fn delete_all(&self) -> Result<()>;

    /// Subscribe to the table. The receiver holds the current snapshot and is
    /// notified whenever the contents change.
    fn observe_all(&self) -> watch::Receiver<Vec<LocalTask>>;
}

/// Remote task service
#[async_trait]
pub trait NetworkTaskSource: Send + Sync {
    /// Get all tasks, ordered by id
    async fn get_all(&self) -> Result<Vec<NetworkTask>>;

    /// Get a task by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<NetworkTask>>;

    /// Create or overwrite a task
    async fn upsert(&self, task: NetworkTask) -> Result<()>;

    /// Replace the whole remote collection
    async fn save_all(&self, tasks: Vec<NetworkTask>) -> Result<()>;

    /// Delete a task by ID. Returns false if the task did not exist.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Delete every completed task, returning how many were removed
    async fn delete_completed(&self) -> Result<usize>;

    /// Delete all tasks
    async fn delete_all(&self) -> Result<()>;

    /// Subscribe to the remote collection
    fn observe_all(&self) -> watch::Receiver<Vec<NetworkTask>>;
}
