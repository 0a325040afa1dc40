//! Task module
//!
//! This module contains the task model, its data sources and the repository
//! that ties them together.

mod file_store;
pub mod mapper;
mod model;
mod network;
mod repository;
mod source;
mod stream;

pub use file_store::FileTaskStore;
pub use model::*;
pub use network::{seed_tasks, SimulatedNetworkDataSource};
pub use repository::{DefaultTaskRepository, TaskRepository};
pub use source::{LocalTaskSource, NetworkTaskSource};
pub use stream::{SingleTaskStream, TaskStream, TasksStream};
