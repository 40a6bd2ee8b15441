//! Durable-store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    /// Number of read connections (clamped to the pool maximum).
    pub read_pool_size: usize,
    /// SQLite busy handler timeout.
    pub busy_timeout_ms: u64,
    /// How long a mutation waits for the write connection.
    pub write_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: 4,
            busy_timeout_ms: 5_000,
            write_timeout_ms: 10_000,
        }
    }
}
