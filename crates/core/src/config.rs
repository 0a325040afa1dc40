//! Environment configuration
//!
//! Values come from `TODO_*` environment variables with defaults suitable for
//! a local development checkout.

use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding `tasks.json` and `remote.json`
pub const DEFAULT_DATA_DIR: &str = ".todo-data";

/// Simulated round trip of the remote service
pub const DEFAULT_NETWORK_LATENCY: Duration = Duration::from_millis(2000);

/// Runtime configuration for the data layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub data_dir: PathBuf,
    pub network_latency: Duration,
    /// Keep the simulated remote collection in `remote.json` between runs
    pub persist_remote: bool,
    /// Start with the remote service unreachable
    pub offline: bool,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            network_latency: DEFAULT_NETWORK_LATENCY,
            persist_remote: true,
            offline: false,
        }
    }
}

impl TodoConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("TODO_DATA_DIR")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let network_latency = match lookup("TODO_NETWORK_LATENCY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!("Ignoring invalid TODO_NETWORK_LATENCY_MS: {}", raw);
                    defaults.network_latency
                }
            },
            None => defaults.network_latency,
        };

        Self {
            data_dir,
            network_latency,
            persist_remote: parse_flag(lookup("TODO_PERSIST_REMOTE"), defaults.persist_remote),
            offline: parse_flag(lookup("TODO_OFFLINE"), defaults.offline),
        }
    }

    /// Override the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Override the simulated network latency
    pub fn with_network_latency(mut self, latency: Duration) -> Self {
        self.network_latency = latency;
        self
    }

    /// Path of the local task table
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }

    /// Path of the simulated remote snapshot
    pub fn remote_snapshot_path(&self) -> PathBuf {
        self.data_dir.join("remote.json")
    }
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}
