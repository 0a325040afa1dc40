//! Add/edit task screen state

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use todo_core::task::TaskRepository;

use crate::message::UserMessage;
use crate::scope::ViewModelScope;
use crate::state::StateHolder;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddEditTaskUiState {
    pub title: String,
    pub description: String,
    pub is_task_completed: bool,
    pub is_loading: bool,
    pub user_message: Option<UserMessage>,
    pub is_task_saved: bool,
}

struct Inner {
    /// Task being edited, `None` when adding
    task_id: Option<String>,
    repository: Arc<dyn TaskRepository>,
    holder: StateHolder<AddEditTaskUiState, AddEditTaskUiState>,
}

impl Inner {
    fn saved(&self) {
        self.holder.update(|s| {
            s.is_loading = false;
            s.is_task_saved = true;
        });
    }

    fn save_failed(&self) {
        self.holder.update(|s| {
            s.is_loading = false;
            s.user_message = Some(UserMessage::SavingTaskError);
        });
    }

    fn load_failed(&self) {
        self.holder.update(|s| {
            s.is_loading = false;
            s.user_message = Some(UserMessage::LoadingTaskError);
        });
    }
}

/// View-model for the add/edit task screen
///
/// The view-model owns the editable copy of the task; the screen pushes every
/// edit through [`update_title`](Self::update_title) and
/// [`update_description`](Self::update_description).
pub struct AddEditTaskViewModel {
    inner: Arc<Inner>,
    scope: ViewModelScope,
}

impl AddEditTaskViewModel {
    /// Create the view-model; editing an existing task loads it first
    pub fn new(repository: Arc<dyn TaskRepository>, task_id: Option<String>) -> Self {
        let initial = AddEditTaskUiState::default();
        let inner = Arc::new(Inner {
            task_id,
            repository,
            holder: StateHolder::new(initial.clone(), initial, AddEditTaskUiState::clone),
        });
        let vm = Self {
            inner,
            scope: ViewModelScope::new(),
        };

        if let Some(task_id) = vm.inner.task_id.clone() {
            vm.load_task(task_id);
        }
        vm
    }

    pub fn task_id(&self) -> Option<&str> {
        self.inner.task_id.as_deref()
    }

    pub fn ui_state(&self) -> AddEditTaskUiState {
        self.inner.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<AddEditTaskUiState> {
        self.inner.holder.subscribe()
    }

    /// Wait until no load or save is in flight
    pub async fn settled(&self) -> AddEditTaskUiState {
        self.inner.holder.wait_for(|state| !state.is_loading).await
    }

    pub fn update_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.inner.holder.update(|s| s.title = title);
    }

    pub fn update_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.inner.holder.update(|s| s.description = description);
    }

    /// Create or update the task
    ///
    /// Returns `None` without touching the repository when the title or the
    /// description is empty.
    pub fn save_task(&self) -> Option<JoinHandle<()>> {
        let state = self.ui_state();
        if state.title.is_empty() || state.description.is_empty() {
            self.inner
                .holder
                .update(|s| s.user_message = Some(UserMessage::EmptyTaskMessage));
            return None;
        }

        self.inner.holder.update(|s| s.is_loading = true);
        let inner = self.inner.clone();
        let handle = match inner.task_id.clone() {
            None => self.scope.launch(async move {
                match inner
                    .repository
                    .create_task(&state.title, &state.description)
                    .await
                {
                    Ok(id) => {
                        info!(task_id = %id, "Task added");
                        inner.saved();
                    }
                    Err(e) => {
                        error!("Failed to create task: {}", e);
                        inner.save_failed();
                    }
                }
            }),
            Some(task_id) => self.scope.launch(async move {
                match inner
                    .repository
                    .update_task(&task_id, &state.title, &state.description)
                    .await
                {
                    Ok(()) => inner.saved(),
                    Err(e) => {
                        error!(task_id = %task_id, "Failed to update task: {}", e);
                        inner.save_failed();
                    }
                }
            }),
        };
        Some(handle)
    }

    pub fn snackbar_message_shown(&self) {
        self.inner.holder.update(|s| s.user_message = None);
    }

    /// Tear the screen down, cancelling its pending work
    pub fn close(&self) {
        self.scope.cancel();
    }

    fn load_task(&self, task_id: String) -> JoinHandle<()> {
        self.inner.holder.update(|s| s.is_loading = true);
        let inner = self.inner.clone();
        self.scope.launch(async move {
            match inner.repository.get_task(&task_id, false).await {
                Ok(Some(task)) => inner.holder.update(|s| {
                    s.title = task.title;
                    s.description = task.description;
                    s.is_task_completed = task.is_completed;
                    s.is_loading = false;
                }),
                Ok(None) => inner.load_failed(),
                Err(e) => {
                    error!(task_id = %task_id, "Failed to load task: {}", e);
                    inner.load_failed();
                }
            }
        })
    }
}
