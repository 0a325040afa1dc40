//! User-facing message codes shown as transient notices

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserMessage {
    CompletedTasksCleared,
    TaskMarkedComplete,
    TaskMarkedActive,
    LoadingTasksError,
    LoadingTaskError,
    TaskNotFound,
    EmptyTaskMessage,
    SavingTaskError,
    SuccessfullySavedTask,
    SuccessfullyAddedTask,
    SuccessfullyDeletedTask,
}

impl UserMessage {
    pub fn text(self) -> &'static str {
        match self {
            Self::CompletedTasksCleared => "Completed tasks cleared",
            Self::TaskMarkedComplete => "Task marked complete",
            Self::TaskMarkedActive => "Task marked active",
            Self::LoadingTasksError => "Error while loading tasks",
            Self::LoadingTaskError => "Error while loading task",
            Self::TaskNotFound => "Task not found",
            Self::EmptyTaskMessage => "Tasks cannot be empty",
            Self::SavingTaskError => "Error while saving task",
            Self::SuccessfullySavedTask => "Task saved",
            Self::SuccessfullyAddedTask => "Task added",
            Self::SuccessfullyDeletedTask => "Task was deleted",
        }
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
