//! Task repository
//!
//! Single entry point for task data. Reads are served from the local table,
//! which is refreshed from the remote service the first time a lookup is made
//! or whenever the caller forces it. Writes go to the local table first and
//! are then mirrored to the remote service.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::mapper::{to_domain_list, to_local_list};
use super::model::{LocalTask, Task};
use super::source::{LocalTaskSource, NetworkTaskSource};
use super::stream::{SingleTaskStream, TasksStream};
use crate::{Error, Result};

/// Repository interface used by the screens
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get all tasks, refreshing from the remote first if forced or never done
    async fn get_tasks(&self, force_update: bool) -> Result<Vec<Task>>;

    /// Get a task by ID, refreshing it from the remote first if forced or
    /// never done
    async fn get_task(&self, id: &str, force_update: bool) -> Result<Option<Task>>;

    /// Replace the local table with the remote collection
    async fn refresh(&self) -> Result<()>;

    /// Replace one local task with its remote counterpart
    async fn refresh_task(&self, id: &str) -> Result<()>;

    /// Create a new active task and return its ID
    async fn create_task(&self, title: &str, description: &str) -> Result<String>;

    /// Change the title and description of an existing task
    async fn update_task(&self, id: &str, title: &str, description: &str) -> Result<()>;

    async fn complete_task(&self, id: &str) -> Result<()>;

    async fn activate_task(&self, id: &str) -> Result<()>;

    async fn delete_task(&self, id: &str) -> Result<()>;

    /// Delete every completed task
    async fn clear_completed_tasks(&self) -> Result<()>;

    async fn delete_all_tasks(&self) -> Result<()>;

    /// Observe the task collection
    fn observe_tasks(&self) -> TasksStream;

    /// Observe a single task
    fn observe_task(&self, id: &str) -> SingleTaskStream;
}

/// Which lookups have been served from the remote at least once
#[derive(Debug, Default)]
struct RefreshState {
    all: bool,
    ids: HashSet<String>,
}

impl RefreshState {
    fn covers(&self, id: &str) -> bool {
        self.all || self.ids.contains(id)
    }
}

/// Repository combining a local table with the remote service
pub struct DefaultTaskRepository {
    local: Arc<dyn LocalTaskSource>,
    network: Arc<dyn NetworkTaskSource>,
    refreshed: Mutex<RefreshState>,
}

impl DefaultTaskRepository {
    pub fn new(local: Arc<dyn LocalTaskSource>, network: Arc<dyn NetworkTaskSource>) -> Self {
        Self {
            local,
            network,
            refreshed: Mutex::new(RefreshState::default()),
        }
    }

    async fn mark_refreshed(&self, id: &str) {
        self.refreshed.lock().await.ids.insert(id.to_string());
    }

    async fn require_local(&self, id: &str) -> Result<LocalTask> {
        self.local
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<()> {
        if !self.local.update_completed(id, completed).await? {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        let task = self.require_local(id).await?;
        self.network.upsert(task.to_network()).await?;
        self.mark_refreshed(id).await;

        info!(task_id = %id, completed, "Task completion changed");
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for DefaultTaskRepository {
    async fn get_tasks(&self, force_update: bool) -> Result<Vec<Task>> {
        let stale = force_update || !self.refreshed.lock().await.all;
        if stale {
            self.refresh().await?;
        }
        let tasks = self.local.get_all().await?;
        Ok(to_domain_list(&tasks))
    }

    async fn get_task(&self, id: &str, force_update: bool) -> Result<Option<Task>> {
        let stale = force_update || !self.refreshed.lock().await.covers(id);
        if stale {
            self.refresh_task(id).await?;
        }
        let task = self.local.get_by_id(id).await?;
        Ok(task.map(Task::from))
    }

    async fn refresh(&self) -> Result<()> {
        let remote = self.network.get_all().await?;
        let count = remote.len();
        self.local.replace_all(to_local_list(&remote)).await?;

        let mut refreshed = self.refreshed.lock().await;
        refreshed.all = true;
        refreshed.ids.clear();

        info!("Refreshed {} tasks from remote", count);
        Ok(())
    }

    async fn refresh_task(&self, id: &str) -> Result<()> {
        match self.network.get_by_id(id).await? {
            Some(remote) => {
                debug!(task_id = %id, "Refreshed task from remote");
                self.local.upsert(remote.to_local()).await?;
            }
            None => {
                debug!(task_id = %id, "Task missing on remote, dropping local copy");
                self.local.delete_by_id(id).await?;
            }
        }
        self.mark_refreshed(id).await;
        Ok(())
    }

    async fn create_task(&self, title: &str, description: &str) -> Result<String> {
        let task = Task::new(title).with_description(description);
        self.local.upsert(task.to_local()).await?;
        self.network.upsert(task.to_network()).await?;
        self.mark_refreshed(&task.id).await;

        info!(task_id = %task.id, "Created task");
        Ok(task.id)
    }

    async fn update_task(&self, id: &str, title: &str, description: &str) -> Result<()> {
        let mut task = self.require_local(id).await?;
        task.title = title.to_string();
        task.description = description.to_string();

        self.local.upsert(task.clone()).await?;
        self.network.upsert(task.to_network()).await?;
        self.mark_refreshed(id).await;

        info!(task_id = %id, "Updated task");
        Ok(())
    }

    async fn complete_task(&self, id: &str) -> Result<()> {
        self.set_completed(id, true).await
    }

    async fn activate_task(&self, id: &str) -> Result<()> {
        self.set_completed(id, false).await
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        self.local.delete_by_id(id).await?;
        self.network.delete_by_id(id).await?;
        self.mark_refreshed(id).await;

        info!(task_id = %id, "Deleted task");
        Ok(())
    }

    async fn clear_completed_tasks(&self) -> Result<()> {
        let removed = self.local.delete_completed().await?;
        self.network.delete_completed().await?;

        info!("Cleared {} completed tasks", removed);
        Ok(())
    }

    async fn delete_all_tasks(&self) -> Result<()> {
        self.local.delete_all().await?;
        self.network.delete_all().await?;

        info!("Deleted all tasks");
        Ok(())
    }

    fn observe_tasks(&self) -> TasksStream {
        TasksStream::all(self.local.observe_all())
    }

    fn observe_task(&self, id: &str) -> SingleTaskStream {
        SingleTaskStream::single(self.local.observe_all(), id)
    }
}
