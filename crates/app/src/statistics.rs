//! Statistics screen state

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::error;

use todo_core::task::{Task, TaskRepository};

use crate::scope::ViewModelScope;
use crate::state::StateHolder;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsUiState {
    pub is_empty: bool,
    pub is_loading: bool,
    pub active_tasks_percent: f32,
    pub completed_tasks_percent: f32,
    /// Description of the last load failure
    pub error: Option<String>,
}

/// Share of active and completed tasks, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsResult {
    pub active_tasks_percent: f32,
    pub completed_tasks_percent: f32,
}

pub fn get_active_and_completed_stats(tasks: &[Task]) -> StatsResult {
    if tasks.is_empty() {
        return StatsResult::default();
    }

    let total = tasks.len() as f32;
    let completed = tasks.iter().filter(|t| t.is_completed).count() as f32;
    let active = total - completed;

    StatsResult {
        active_tasks_percent: 100.0 * active / total,
        completed_tasks_percent: 100.0 * completed / total,
    }
}

struct StatisticsInputs {
    tasks: Option<Vec<Task>>,
    is_loading: bool,
    error: Option<String>,
}

fn produce_ui_state(inputs: &StatisticsInputs) -> StatisticsUiState {
    let stats = inputs
        .tasks
        .as_deref()
        .map(get_active_and_completed_stats)
        .unwrap_or_default();

    StatisticsUiState {
        is_empty: inputs.tasks.as_ref().map_or(true, Vec::is_empty),
        is_loading: inputs.is_loading,
        active_tasks_percent: stats.active_tasks_percent,
        completed_tasks_percent: stats.completed_tasks_percent,
        error: inputs.error.clone(),
    }
}

struct Inner {
    repository: Arc<dyn TaskRepository>,
    holder: StateHolder<StatisticsInputs, StatisticsUiState>,
}

/// View-model for the statistics screen
pub struct StatisticsViewModel {
    inner: Arc<Inner>,
    scope: ViewModelScope,
}

impl StatisticsViewModel {
    /// Create the view-model, observe the repository and refresh once
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        let inputs = StatisticsInputs {
            tasks: None,
            is_loading: true,
            error: None,
        };
        let initial = StatisticsUiState {
            is_loading: true,
            ..StatisticsUiState::default()
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

    pub fn ui_state(&self) -> StatisticsUiState {
        self.inner.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatisticsUiState> {
        self.inner.holder.subscribe()
    }

    /// Wait until no load is in flight and return the state at that point
    pub async fn settled(&self) -> StatisticsUiState {
        self.inner.holder.wait_for(|state| !state.is_loading).await
    }

    pub fn refresh(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        self.inner.holder.update(|i| i.is_loading = true);
        self.scope.launch(async move {
            match inner.repository.get_tasks(true).await {
                Ok(tasks) => inner.holder.update(|i| {
                    i.tasks = Some(tasks);
                    i.error = None;
                    i.is_loading = false;
                }),
                Err(e) => {
                    error!("Failed to load statistics: {}", e);
                    inner.holder.update(|i| {
                        i.error = Some(e.to_string());
                        i.is_loading = false;
                    });
                }
            }
        })
    }

    /// Tear the screen down, cancelling its pending work
    pub fn close(&self) {
        self.scope.cancel();
    }
}
