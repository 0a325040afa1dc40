//! Simulated remote task service
//!
//! Keeps the remote collection in memory (optionally mirrored to a JSON
//! snapshot) and delays every call to stand in for a network round trip.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use super::model::NetworkTask;
use super::source::NetworkTaskSource;
use crate::{Error, Result};

/// In-process stand-in for the task backend
pub struct SimulatedNetworkDataSource {
    tasks: Mutex<BTreeMap<String, NetworkTask>>,
    latency: Duration,
    unavailable: AtomicBool,
    snapshot: Option<PathBuf>,
    changes: watch::Sender<Vec<NetworkTask>>,
}

/// Records the backend starts with
pub fn seed_tasks() -> Vec<NetworkTask> {
    vec![
        NetworkTask::new(
            "PISA",
            "Build tower in Pisa",
            "Ground looks good, no foundation work required.",
        ),
        NetworkTask::new(
            "TACOMA",
            "Finish bridge in Tacoma",
            "Found awesome girders at half the cost!",
        ),
    ]
}

impl SimulatedNetworkDataSource {
    /// Backend holding the seed tasks
    pub fn new(latency: Duration) -> Self {
        Self::with_tasks(seed_tasks(), latency)
    }

    /// Backend with no tasks
    pub fn empty(latency: Duration) -> Self {
        Self::with_tasks(Vec::new(), latency)
    }

    /// Backend holding `tasks`
    pub fn with_tasks(tasks: impl IntoIterator<Item = NetworkTask>, latency: Duration) -> Self {
        Self::from_parts(tasks, latency, None)
    }

    /// Backend mirrored to a JSON file so the collection outlives the process
    ///
    /// A missing file starts from the seed tasks.
    pub async fn with_snapshot(path: impl Into<PathBuf>, latency: Duration) -> Result<Self> {
        let path = path.into();
        let tasks = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            seed_tasks()
        };
        debug!("Remote snapshot {} holds {} tasks", path.display(), tasks.len());
        Ok(Self::from_parts(tasks, latency, Some(path)))
    }

    fn from_parts(
        tasks: impl IntoIterator<Item = NetworkTask>,
        latency: Duration,
        snapshot: Option<PathBuf>,
    ) -> Self {
        let tasks: BTreeMap<String, NetworkTask> =
            tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        let (changes, _) = watch::channel(tasks.values().cloned().collect());
        Self {
            tasks: Mutex::new(tasks),
            latency,
            unavailable: AtomicBool::new(false),
            snapshot,
            changes,
        }
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        info!(unavailable, "Simulated remote availability changed");
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Wait out the simulated round trip, failing if the service is down
    async fn round_trip(&self) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Network("remote task service unavailable".to_string()));
        }
        Ok(())
    }

    /// Write `next` to the snapshot file, then install it and notify observers
    async fn commit(
        &self,
        tasks: &mut BTreeMap<String, NetworkTask>,
        next: BTreeMap<String, NetworkTask>,
    ) -> Result<()> {
        let snapshot: Vec<NetworkTask> = next.values().cloned().collect();

        if let Some(path) = &self.snapshot {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, serde_json::to_string_pretty(&snapshot)?).await?;
        }

        *tasks = next;
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
impl NetworkTaskSource for SimulatedNetworkDataSource {
    async fn get_all(&self) -> Result<Vec<NetworkTask>> {
        self.round_trip().await?;
        let tasks = self.tasks.lock().await;
        Ok(tasks.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<NetworkTask>> {
        self.round_trip().await?;
        let tasks = self.tasks.lock().await;
        Ok(tasks.get(id).cloned())
    }

    async fn upsert(&self, task: NetworkTask) -> Result<()> {
        self.round_trip().await?;
        let mut tasks = self.tasks.lock().await;
        let mut next = tasks.clone();
        next.insert(task.id.clone(), task);
        self.commit(&mut tasks, next).await
    }

    async fn save_all(&self, new_tasks: Vec<NetworkTask>) -> Result<()> {
        self.round_trip().await?;
        let mut tasks = self.tasks.lock().await;
        let next = new_tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        self.commit(&mut tasks, next).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        self.round_trip().await?;
        let mut tasks = self.tasks.lock().await;
        if !tasks.contains_key(id) {
            return Ok(false);
        }
        let mut next = tasks.clone();
        next.remove(id);
        self.commit(&mut tasks, next).await?;
        Ok(true)
    }

    async fn delete_completed(&self) -> Result<usize> {
        self.round_trip().await?;
        let mut tasks = self.tasks.lock().await;
        let mut next = tasks.clone();
        next.retain(|_, task| !task.is_complete());
        let removed = tasks.len() - next.len();
        if removed > 0 {
            self.commit(&mut tasks, next).await?;
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> Result<()> {
        self.round_trip().await?;
        let mut tasks = self.tasks.lock().await;
        self.commit(&mut tasks, BTreeMap::new()).await
    }

    fn observe_all(&self) -> watch::Receiver<Vec<NetworkTask>> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NetworkTaskStatus;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_starts_with_seed_tasks() {
        let remote = SimulatedNetworkDataSource::new(Duration::ZERO);
        let ids: Vec<String> = remote.get_all().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["PISA", "TACOMA"]);
    }

    #[tokio::test]
    async fn test_crud() {
        let remote = SimulatedNetworkDataSource::empty(Duration::ZERO);

        let mut task = NetworkTask::new("1", "Title", "Short");
        remote.upsert(task.clone()).await.unwrap();
        assert_eq!(remote.get_by_id("1").await.unwrap(), Some(task.clone()));

        task.status = NetworkTaskStatus::Complete;
        remote.upsert(task).await.unwrap();
        remote.upsert(NetworkTask::new("2", "Other", "Short")).await.unwrap();

        assert_eq!(remote.delete_completed().await.unwrap(), 1);
        assert!(remote.get_by_id("1").await.unwrap().is_none());

        assert!(remote.delete_by_id("2").await.unwrap());
        assert!(!remote.delete_by_id("2").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_all_replaces_collection() {
        let remote = SimulatedNetworkDataSource::new(Duration::ZERO);
        remote
            .save_all(vec![NetworkTask::new("new", "Title new", "Description new")])
            .await
            .unwrap();

        let tasks = remote.get_all().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "new");
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let remote = SimulatedNetworkDataSource::new(Duration::ZERO);
        remote.set_unavailable(true);

        match remote.get_all().await {
            Err(Error::Network(_)) => {}
            other => panic!("Expected Network error, got: {:?}", other),
        }
        assert!(remote.delete_all().await.is_err());

        remote.set_unavailable(false);
        assert_eq!(remote.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_wait_for_latency() {
        let remote = SimulatedNetworkDataSource::new(Duration::from_secs(2));
        let started = tokio::time::Instant::now();
        remote.get_all().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("remote.json");

        {
            let remote = SimulatedNetworkDataSource::with_snapshot(&path, Duration::ZERO)
                .await
                .unwrap();
            remote.delete_by_id("PISA").await.unwrap();
        }

        let remote = SimulatedNetworkDataSource::with_snapshot(&path, Duration::ZERO)
            .await
            .unwrap();
        let ids: Vec<String> = remote.get_all().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["TACOMA"]);
    }

    #[tokio::test]
    async fn test_observe_all() {
        let remote = SimulatedNetworkDataSource::empty(Duration::ZERO);
        let mut rx = remote.observe_all();
        assert!(rx.borrow_and_update().is_empty());

        remote.upsert(NetworkTask::new("1", "Title", "Short")).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
