//! Shared fixtures for view-model tests

use std::sync::Arc;
use std::time::Duration;
use todo_core::task::{
    DefaultTaskRepository, FileTaskStore, SimulatedNetworkDataSource, Task, TaskRepository,
};

pub(crate) struct Fixture {
    pub local: Arc<FileTaskStore>,
    pub network: Arc<SimulatedNetworkDataSource>,
    pub repository: Arc<dyn TaskRepository>,
}

/// Repository whose remote holds `remote` and whose local table is empty
pub(crate) fn fixture(remote: &[Task]) -> Fixture {
    fixture_with_latency(remote, Duration::ZERO)
}

/// Like [`fixture`], with every remote call taking `latency`
pub(crate) fn fixture_with_latency(remote: &[Task], latency: Duration) -> Fixture {
    let local = Arc::new(FileTaskStore::in_memory());
    let network = Arc::new(SimulatedNetworkDataSource::with_tasks(
        remote.iter().map(Task::to_network),
        latency,
    ));
    let repository: Arc<dyn TaskRepository> =
        Arc::new(DefaultTaskRepository::new(local.clone(), network.clone()));
    Fixture {
        local,
        network,
        repository,
    }
}

pub(crate) fn task(id: &str, completed: bool) -> Task {
    Task::new(format!("Title{}", id))
        .with_id(id)
        .with_description(format!("Description{}", id))
        .with_completed(completed)
}

/// Bound a wait on observable state so a broken test fails instead of hanging
pub(crate) async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out waiting for UI state")
}
