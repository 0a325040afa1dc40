//! Observable views over the local task table

use tokio::sync::watch;

use super::model::{LocalTask, Task};

type Projection<T> = Box<dyn Fn(&[LocalTask]) -> T + Send + Sync>;

/// A continuously updated projection of the local table
///
/// The first call to [`next`](Self::next) yields the current value; later
/// calls wait until the table changes in a way that alters the projected
/// value. Changes that project to an equal value are skipped.
pub struct TaskStream<T> {
    rx: watch::Receiver<Vec<LocalTask>>,
    project: Projection<T>,
    last: Option<T>,
}

/// Stream of the whole task collection
pub type TasksStream = TaskStream<Vec<Task>>;

/// Stream of a single task, `None` while it does not exist
pub type SingleTaskStream = TaskStream<Option<Task>>;

impl<T> TaskStream<T>
where
    T: Clone + PartialEq,
{
    pub fn new<F>(rx: watch::Receiver<Vec<LocalTask>>, project: F) -> Self
    where
        F: Fn(&[LocalTask]) -> T + Send + Sync + 'static,
    {
        Self {
            rx,
            project: Box::new(project),
            last: None,
        }
    }

    /// Value of the projection right now
    pub fn current(&self) -> T {
        (self.project)(self.rx.borrow().as_slice())
    }

    /// Wait for the next distinct value
    ///
    /// Returns `None` once the underlying store has been dropped.
    pub async fn next(&mut self) -> Option<T> {
        if self.last.is_none() {
            let value = (self.project)(self.rx.borrow_and_update().as_slice());
            self.last = Some(value.clone());
            return Some(value);
        }

        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            let value = (self.project)(self.rx.borrow_and_update().as_slice());
            if self.last.as_ref() != Some(&value) {
                self.last = Some(value.clone());
                return Some(value);
            }
        }
    }
}

impl TasksStream {
    pub fn all(rx: watch::Receiver<Vec<LocalTask>>) -> Self {
        Self::new(rx, super::mapper::to_domain_list)
    }
}

impl SingleTaskStream {
    pub fn single(rx: watch::Receiver<Vec<LocalTask>>, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(rx, move |tasks| {
            tasks.iter().find(|t| t.id == id).map(LocalTask::to_domain)
        })
    }
}
