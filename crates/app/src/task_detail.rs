//! Task detail screen state

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use todo_core::task::{Task, TaskRepository};

use crate::message::UserMessage;
use crate::scope::ViewModelScope;
use crate::state::StateHolder;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDetailUiState {
    pub task: Option<Task>,
    pub is_loading: bool,
    pub user_message: Option<UserMessage>,
    pub is_task_deleted: bool,
}

struct DetailInputs {
    task: Option<Task>,
    loaded: bool,
    is_loading: bool,
    user_message: Option<UserMessage>,
    is_task_deleted: bool,
}

fn produce_ui_state(inputs: &DetailInputs) -> TaskDetailUiState {
    TaskDetailUiState {
        task: inputs.task.clone(),
        is_loading: inputs.is_loading || !inputs.loaded,
        user_message: inputs.user_message,
        is_task_deleted: inputs.is_task_deleted,
    }
}

struct Inner {
    task_id: String,
    repository: Arc<dyn TaskRepository>,
    holder: StateHolder<DetailInputs, TaskDetailUiState>,
}

impl Inner {
    fn apply_task(&self, task: Option<Task>) {
        self.holder.update(|i| {
            if task.is_none() {
                i.user_message = Some(UserMessage::TaskNotFound);
            }
            i.task = task;
            i.loaded = true;
        });
    }
}

/// View-model for the task detail screen
pub struct TaskDetailViewModel {
    inner: Arc<Inner>,
    scope: ViewModelScope,
}

impl TaskDetailViewModel {
    /// Create the view-model for `task_id` and start observing that task
    pub fn new(repository: Arc<dyn TaskRepository>, task_id: impl Into<String>) -> Self {
        let inputs = DetailInputs {
            task: None,
            loaded: false,
            is_loading: false,
            user_message: None,
            is_task_deleted: false,
        };
        let initial = TaskDetailUiState {
            is_loading: true,
            ..TaskDetailUiState::default()
        };
        let inner = Arc::new(Inner {
            task_id: task_id.into(),
            repository,
            holder: StateHolder::new(inputs, initial, produce_ui_state),
        });
        let vm = Self {
            inner,
            scope: ViewModelScope::new(),
        };

        let inner = vm.inner.clone();
        vm.scope.launch(async move {
            let mut stream = inner.repository.observe_task(&inner.task_id);
            while let Some(task) = stream.next().await {
                inner.apply_task(task);
            }
        });
        vm
    }

    pub fn task_id(&self) -> &str {
        &self.inner.task_id
    }

    pub fn ui_state(&self) -> TaskDetailUiState {
        self.inner.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskDetailUiState> {
        self.inner.holder.subscribe()
    }

    /// Wait until no load is in flight and return the state at that point
    pub async fn settled(&self) -> TaskDetailUiState {
        self.inner.holder.wait_for(|state| !state.is_loading).await
    }

    pub fn delete_task(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.scope.launch(async move {
            match inner.repository.delete_task(&inner.task_id).await {
                Ok(()) => inner.holder.update(|i| i.is_task_deleted = true),
                Err(e) => error!(task_id = %inner.task_id, "Failed to delete task: {}", e),
            }
        })
    }

    pub fn set_completed(&self, completed: bool) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.scope.launch(async move {
            let Some(task) = inner.holder.read(|i| i.task.clone()) else {
                warn!(task_id = %inner.task_id, "No task loaded to update");
                return;
            };

            let (result, message) = if completed {
                (
                    inner.repository.complete_task(&task.id).await,
                    UserMessage::TaskMarkedComplete,
                )
            } else {
                (
                    inner.repository.activate_task(&task.id).await,
                    UserMessage::TaskMarkedActive,
                )
            };
            match result {
                Ok(()) => inner.holder.update(|i| i.user_message = Some(message)),
                Err(e) => error!(task_id = %task.id, "Failed to change task state: {}", e),
            }
        })
    }

    /// Reload the task from the remote service
    pub fn refresh(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.inner.holder.update(|i| i.is_loading = true);
        self.scope.launch(async move {
            match inner.repository.get_task(&inner.task_id, true).await {
                Ok(task) => {
                    inner.apply_task(task);
                    inner.holder.update(|i| i.is_loading = false);
                }
                Err(e) => {
                    error!(task_id = %inner.task_id, "Failed to refresh task: {}", e);
                    inner.holder.update(|i| {
                        i.is_loading = false;
                        i.loaded = true;
                        i.user_message = Some(UserMessage::LoadingTaskError);
                    });
                }
            }
        })
    }

    pub fn snackbar_message_shown(&self) {
        self.inner.holder.update(|i| i.user_message = None);
    }

    /// Tear the screen down, cancelling its pending work
    pub fn close(&self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, task, within};
    use todo_core::task::NetworkTaskSource;

    #[tokio::test]
    async fn test_shows_cached_task() {
        let f = fixture(&[task("1", false)]);
        f.repository.refresh().await.unwrap();

        let vm = TaskDetailViewModel::new(f.repository.clone(), "1");
        let state = within(vm.settled()).await;

        assert_eq!(state.task, Some(task("1", false)));
        assert!(state.user_message.is_none());
        assert!(!state.is_task_deleted);
        assert_eq!(vm.task_id(), "1");
    }

    #[tokio::test]
    async fn test_missing_task_reports_not_found() {
        let f = fixture(&[]);
        let vm = TaskDetailViewModel::new(f.repository.clone(), "missing");

        let state = within(vm.settled()).await;
        assert!(state.task.is_none());
        assert_eq!(state.user_message, Some(UserMessage::TaskNotFound));
    }

    #[tokio::test]
    async fn test_refresh_loads_from_remote() {
        let f = fixture(&[task("1", true)]);
        let vm = TaskDetailViewModel::new(f.repository.clone(), "1");
        within(vm.settled()).await;

        within(vm.refresh()).await.unwrap();

        let state = vm.ui_state();
        assert_eq!(state.task, Some(task("1", true)));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_refresh_failure_reports_error() {
        let f = fixture(&[task("1", false)]);
        f.network.set_unavailable(true);
        let vm = TaskDetailViewModel::new(f.repository.clone(), "1");
        within(vm.settled()).await;

        within(vm.refresh()).await.unwrap();
        assert_eq!(vm.ui_state().user_message, Some(UserMessage::LoadingTaskError));
    }

    #[tokio::test]
    async fn test_set_completed() {
        let f = fixture(&[task("1", false)]);
        f.repository.refresh().await.unwrap();
        let vm = TaskDetailViewModel::new(f.repository.clone(), "1");
        within(vm.settled()).await;

        within(vm.set_completed(true)).await.unwrap();

        let mut rx = vm.subscribe();
        let state = within(rx.wait_for(|s| s.task.as_ref().is_some_and(|t| t.is_completed)))
            .await
            .unwrap()
            .clone();
        assert_eq!(state.user_message, Some(UserMessage::TaskMarkedComplete));
        assert!(f.network.get_by_id("1").await.unwrap().unwrap().is_complete());

        within(vm.set_completed(false)).await.unwrap();
        assert_eq!(vm.ui_state().user_message, Some(UserMessage::TaskMarkedActive));
    }

    #[tokio::test]
    async fn test_delete_task() {
        let f = fixture(&[task("1", false)]);
        f.repository.refresh().await.unwrap();
        let vm = TaskDetailViewModel::new(f.repository.clone(), "1");
        within(vm.settled()).await;

        within(vm.delete_task()).await.unwrap();

        assert!(vm.ui_state().is_task_deleted);
        assert!(f.network.get_by_id("1").await.unwrap().is_none());
    }
}
