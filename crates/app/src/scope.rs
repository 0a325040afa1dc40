//! Cancellable unit of work owned by a screen
//!
//! Every job a view-model launches runs on the tokio runtime until it
//! finishes or the scope is cancelled. Dropping the scope cancels it.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

pub struct ViewModelScope {
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl ViewModelScope {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Run `job` until it completes or the scope is cancelled
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch<F>(&self, job: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => debug!("view-model job cancelled"),
                _ = job => {}
            }
        })
    }

    /// Cancel every running job and refuse to run new ones
    pub fn cancel(&self) {
        self.tracker.close();
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of jobs still running
    pub fn active_jobs(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every job to stop after [`cancel`](Self::cancel)
    pub async fn closed(&self) {
        self.tracker.wait().await;
    }
}

impl Default for ViewModelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewModelScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
