//! File-based local task storage
//!
//! Stores tasks as JSON in a file on disk, or purely in memory when no path is
//! given.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::model::LocalTask;
use super::source::LocalTaskSource;
use crate::Result;

/// Local task table backed by a JSON file
pub struct FileTaskStore {
    /// Path to the JSON file, `None` for a memory-only table
    path: Option<PathBuf>,
    /// Tasks keyed by id
    cache: RwLock<BTreeMap<String, LocalTask>>,
    /// Latest snapshot for observers
    changes: watch::Sender<Vec<LocalTask>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<LocalTask> = serde_json::from_str(&content)?;
            debug!("Loaded {} local tasks from {}", tasks.len(), path.display());
            tasks.into_iter().map(|t| (t.id.clone(), t)).collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self::from_parts(Some(path), cache))
    }

    /// Create a table that never touches disk
    pub fn in_memory() -> Self {
        Self::from_parts(None, BTreeMap::new())
    }

    /// Create a memory-only table holding `tasks`
    pub fn with_tasks(tasks: impl IntoIterator<Item = LocalTask>) -> Self {
        let cache = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self::from_parts(None, cache)
    }

    fn from_parts(path: Option<PathBuf>, cache: BTreeMap<String, LocalTask>) -> Self {
        let (changes, _) = watch::channel(cache.values().cloned().collect());
        Self {
            path,
            cache: RwLock::new(cache),
            changes,
        }
    }

    /// Location of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist `next`, then install it and notify observers
    ///
    /// Callers hold the write lock so snapshots are published in mutation order.
    /// A failed write leaves `cache` untouched.
    async fn commit(
        &self,
        cache: &mut BTreeMap<String, LocalTask>,
        next: BTreeMap<String, LocalTask>,
    ) -> Result<()> {
        let snapshot: Vec<LocalTask> = next.values().cloned().collect();

        if let Some(path) = &self.path {
            let content = serde_json::to_string_pretty(&snapshot)?;

            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            tokio::fs::write(path, content).await?;
            debug!("Saved {} local tasks to {}", snapshot.len(), path.display());
        }

        *cache = next;
        self.changes.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        Ok(())
    }
}

#[async_trait]
impl LocalTaskSource for FileTaskStore {
    async fn get_all(&self) -> Result<Vec<LocalTask>> {
        let cache = self.cache.read().await;
        Ok(cache.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<LocalTask>> {
        let cache = self.cache.read().await;
        Ok(cache.get(id).cloned())
    }

    async fn upsert(&self, task: LocalTask) -> Result<()> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        next.insert(task.id.clone(), task);
        self.commit(&mut cache, next).await
    }

    async fn replace_all(&self, tasks: Vec<LocalTask>) -> Result<()> {
        let mut cache = self.cache.write().await;
        let next = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        self.commit(&mut cache, next).await
    }

    async fn update_completed(&self, id: &str, completed: bool) -> Result<bool> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        let Some(task) = next.get_mut(id) else {
            return Ok(false);
        };
        task.is_completed = completed;
        self.commit(&mut cache, next).await?;
        Ok(true)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut cache = self.cache.write().await;
        if !cache.contains_key(id) {
            return Ok(false);
        }
        let mut next = cache.clone();
        next.remove(id);
        self.commit(&mut cache, next).await?;
        Ok(true)
    }

    async fn delete_completed(&self) -> Result<usize> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        next.retain(|_, task| !task.is_completed);
        let removed = cache.len() - next.len();
        if removed > 0 {
            self.commit(&mut cache, next).await?;
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        self.commit(&mut cache, BTreeMap::new()).await
    }

    fn observe_all(&self) -> watch::Receiver<Vec<LocalTask>> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local(id: &str, title: &str, completed: bool) -> LocalTask {
        LocalTask {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            is_completed: completed,
        }
    }

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let (store, _temp) = create_test_store().await;

        store.upsert(local("1", "Task 1", false)).await.unwrap();

        let retrieved = store.get_by_id("1").await.unwrap();
        assert_eq!(retrieved, Some(local("1", "Task 1", false)));

        // Test non-existent task
        assert!(store.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let (store, _temp) = create_test_store().await;

        store.upsert(local("1", "Original title", false)).await.unwrap();
        store.upsert(local("1", "Updated title", true)).await.unwrap();

        let tasks = store.get_all().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Updated title");
        assert!(tasks[0].is_completed);
    }

    #[tokio::test]
    async fn test_get_all_is_ordered_by_id() {
        let (store, _temp) = create_test_store().await;

        for id in ["3", "1", "2"] {
            store.upsert(local(id, &format!("Task {}", id), false)).await.unwrap();
        }

        let ids: Vec<String> = store.get_all().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_replace_all_notifies_once() {
        let store = FileTaskStore::with_tasks(vec![local("1", "Old", false)]);
        let mut rx = store.observe_all();
        rx.borrow_and_update();

        store
            .replace_all(vec![local("2", "New", false), local("3", "Newer", true)])
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let ids: Vec<String> = rx.borrow_and_update().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert!(store.get_by_id("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_completed() {
        let (store, _temp) = create_test_store().await;
        store.upsert(local("1", "Task 1", false)).await.unwrap();

        assert!(store.update_completed("1", true).await.unwrap());
        assert!(store.get_by_id("1").await.unwrap().unwrap().is_completed);

        assert!(!store.update_completed("missing", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, _temp) = create_test_store().await;
        store.upsert(local("1", "Task to delete", false)).await.unwrap();

        assert!(store.delete_by_id("1").await.unwrap());
        assert!(store.get_by_id("1").await.unwrap().is_none());

        // Delete again should return false
        assert!(!store.delete_by_id("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_completed_and_all() {
        let (store, _temp) = create_test_store().await;
        store
            .replace_all(vec![
                local("1", "Active", false),
                local("2", "Done 1", true),
                local("3", "Done 2", true),
            ])
            .await
            .unwrap();

        assert_eq!(store.delete_completed().await.unwrap(), 2);
        let remaining = store.get_all().await.unwrap();
        assert_eq!(remaining, vec![local("1", "Active", false)]);

        store.delete_all().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tasks.json");

        {
            let store = FileTaskStore::new(&path).await.unwrap();
            store.upsert(local("1", "Persistent task", true)).await.unwrap();
        }

        let store = FileTaskStore::new(&path).await.unwrap();
        let task = store.get_by_id("1").await.unwrap().unwrap();
        assert_eq!(task.title, "Persistent task");
        assert!(task.is_completed);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_in_memory_store_has_no_path() {
        let store = FileTaskStore::with_tasks(vec![local("1", "Task 1", false)]);
        assert!(store.path().is_none());
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_observe_all_sees_changes() {
        let store = FileTaskStore::in_memory();
        let mut rx = store.observe_all();
        assert!(rx.borrow_and_update().is_empty());

        store.upsert(local("1", "Task 1", false)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        // Writing the same value again is not a change
        store.upsert(local("1", "Task 1", false)).await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_is_not_applied() {
        let (store, temp_dir) = create_test_store().await;
        store.upsert(local("1", "Task 1", false)).await.unwrap();
        let mut rx = store.observe_all();
        rx.borrow_and_update();

        // Replace the backing file with a directory so every write fails
        let path = temp_dir.path().join("tasks.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.upsert(local("2", "Task 2", false)).await.is_err());
        assert!(store.update_completed("1", true).await.is_err());
        assert!(store.delete_by_id("1").await.is_err());
        assert!(store.delete_all().await.is_err());

        assert_eq!(store.get_all().await.unwrap(), vec![local("1", "Task 1", false)]);
        assert!(!rx.has_changed().unwrap());
    }
}
