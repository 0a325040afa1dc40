//! Screen state holders for the to-do blueprint
//!
//! Each view-model turns repository data plus transient screen flags into a
//! single observable UI state, and runs repository calls inside a scope that
//! is cancelled when the screen goes away.

pub mod add_edit_task;
pub mod message;
pub mod scope;
mod state;
pub mod statistics;
pub mod task_detail;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use add_edit_task::{AddEditTaskUiState, AddEditTaskViewModel};
pub use message::UserMessage;
pub use scope::ViewModelScope;
pub use statistics::{StatisticsUiState, StatisticsViewModel};
pub use task_detail::{TaskDetailUiState, TaskDetailViewModel};
pub use tasks::{FilteringUiInfo, TasksFilterType, TasksUiState, TasksViewModel};
