//! Core library for the to-do blueprint
//!
//! This crate contains the data layer, including:
//! - Task model and the mappings between its representations
//! - Local and remote task stores
//! - The caching task repository
//! - Environment configuration

pub mod config;
pub mod error;
pub mod task;

pub use config::TodoConfig;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
