//! Task list screen state

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use todo_core::task::{Task, TaskRepository};

use crate::message::UserMessage;
use crate::scope::ViewModelScope;
use crate::state::StateHolder;

/// Filter applied to the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TasksFilterType {
    /// Do not filter tasks
    #[default]
    AllTasks,
    /// Only tasks not completed yet
    ActiveTasks,
    CompletedTasks,
}

impl TasksFilterType {
    pub fn accepts(self, task: &Task) -> bool {
        match self {
            Self::AllTasks => true,
            Self::ActiveTasks => task.is_active(),
            Self::CompletedTasks => task.is_completed,
        }
    }

    pub fn ui_info(self) -> FilteringUiInfo {
        match self {
            Self::AllTasks => FilteringUiInfo {
                current_filtering_label: "All Tasks",
                no_tasks_label: "You have no tasks!",
            },
            Self::ActiveTasks => FilteringUiInfo {
                current_filtering_label: "Active Tasks",
                no_tasks_label: "You have no active tasks!",
            },
            Self::CompletedTasks => FilteringUiInfo {
                current_filtering_label: "Completed Tasks",
                no_tasks_label: "You have no completed tasks!",
            },
        }
    }
}

/// Labels describing the active filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteringUiInfo {
    pub current_filtering_label: &'static str,
    pub no_tasks_label: &'static str,
}

impl Default for FilteringUiInfo {
    fn default() -> Self {
        TasksFilterType::AllTasks.ui_info()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasksUiState {
    pub items: Vec<Task>,
    pub is_loading: bool,
    pub filtering_ui_info: FilteringUiInfo,
    pub user_message: Option<UserMessage>,
}

struct TasksInputs {
    /// Unfiltered collection, `None` until the first load
    tasks: Option<Vec<Task>>,
    filter: TasksFilterType,
    /// Loads and state changes in flight
    pending: usize,
    user_message: Option<UserMessage>,
}

fn produce_ui_state(inputs: &TasksInputs) -> TasksUiState {
    let items = inputs
        .tasks
        .iter()
        .flatten()
        .filter(|task| inputs.filter.accepts(task))
        .cloned()
        .collect();

    TasksUiState {
        items,
        is_loading: inputs.pending > 0 || inputs.tasks.is_none(),
        filtering_ui_info: inputs.filter.ui_info(),
        user_message: inputs.user_message,
    }
}

struct Inner {
    repository: Arc<dyn TaskRepository>,
    holder: StateHolder<TasksInputs, TasksUiState>,
}

impl Inner {
    fn begin_loading(&self) {
        self.holder.update(|i| i.pending += 1);
    }

    /// Reload the collection; pairs with a preceding [`Self::begin_loading`]
    async fn load(&self) {
        match self.repository.get_tasks(true).await {
            Ok(tasks) => self.holder.update(|i| {
                i.tasks = Some(tasks);
                i.pending = i.pending.saturating_sub(1);
            }),
            Err(e) => {
                error!("Failed to refresh tasks: {}", e);
                self.holder.update(|i| {
                    i.tasks = Some(Vec::new());
                    i.pending = i.pending.saturating_sub(1);
                    i.user_message = Some(UserMessage::LoadingTasksError);
                });
            }
        }
    }

    fn show_message(&self, message: UserMessage) {
        self.holder.update(|i| i.user_message = Some(message));
    }
}

/// View-model for the task list screen
pub struct TasksViewModel {
    inner: Arc<Inner>,
    scope: ViewModelScope,
}

impl TasksViewModel {
    /// Create the view-model, starting with `filter` (restored from a previous
    /// session or [`TasksFilterType::AllTasks`])
    ///
    /// Starts observing the repository and triggers a refresh.
    pub fn new(repository: Arc<dyn TaskRepository>, filter: TasksFilterType) -> Self {
        let inputs = TasksInputs {
            tasks: None,
            filter,
            pending: 0,
            user_message: None,
        };
        let initial = TasksUiState {
            is_loading: true,
            filtering_ui_info: filter.ui_info(),
            ..TasksUiState::default()
        };
        let inner = Arc::new(Inner {
            repository,
            holder: StateHolder::new(inputs, initial, produce_ui_state),
        });
        let vm = Self {
            inner,
            scope: ViewModelScope::new(),
        };

        let inner = vm.inner.clone();
        vm.scope.launch(async move {
            let mut stream = inner.repository.observe_tasks();
            while let Some(tasks) = stream.next().await {
                inner.holder.update(|i| i.tasks = Some(tasks));
            }
        });
        vm.refresh();
        vm
    }

    pub fn ui_state(&self) -> TasksUiState {
        self.inner.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<TasksUiState> {
        self.inner.holder.subscribe()
    }

    /// Wait until no load is in flight and return the state at that point
    pub async fn settled(&self) -> TasksUiState {
        self.inner.holder.wait_for(|state| !state.is_loading).await
    }

    pub fn filtering(&self) -> TasksFilterType {
        self.inner.holder.read(|i| i.filter)
    }

    pub fn set_filtering(&self, filter: TasksFilterType) {
        self.inner.holder.update(|i| i.filter = filter);
    }

    pub fn refresh(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.inner.begin_loading();
        self.scope.launch(async move { inner.load().await })
    }

    pub fn clear_completed_tasks(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.scope.launch(async move {
            match inner.repository.clear_completed_tasks().await {
                Ok(()) => inner.show_message(UserMessage::CompletedTasksCleared),
                Err(e) => error!("Failed to clear completed tasks: {}", e),
            }
            inner.begin_loading();
            inner.load().await;
        })
    }

    pub fn complete_task(&self, task: &Task, completed: bool) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let id = task.id.clone();
        self.inner.begin_loading();
        self.scope.launch(async move {
            let (result, message) = if completed {
                (
                    inner.repository.complete_task(&id).await,
                    UserMessage::TaskMarkedComplete,
                )
            } else {
                (
                    inner.repository.activate_task(&id).await,
                    UserMessage::TaskMarkedActive,
                )
            };
            match result {
                Ok(()) => {
                    info!(task_id = %id, completed, "Task state changed from list");
                    inner.show_message(message);
                }
                Err(e) => error!(task_id = %id, "Failed to change task state: {}", e),
            }
            inner.holder.update(|i| i.pending = i.pending.saturating_sub(1));
        })
    }

    /// Show the outcome reported by the add/edit screen
    pub fn show_edit_result_message(&self, message: UserMessage) {
        self.inner.show_message(message);
    }

    pub fn snackbar_message_shown(&self) {
        self.inner.holder.update(|i| i.user_message = None);
    }

    /// Tear the screen down, cancelling its pending work
    pub fn close(&self) {
        self.scope.cancel();
    }
}
