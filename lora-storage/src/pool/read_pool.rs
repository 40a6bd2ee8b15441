//! Round-robin pool of read-only connections.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use lora_core::config::StorageConfig;
use lora_core::errors::{LoraResult, StorageError};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub const DEFAULT_POOL_SIZE: usize = 4;
pub const MAX_POOL_SIZE: usize = 8;

pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn default_size() -> usize {
        DEFAULT_POOL_SIZE
    }

    /// Open `size` read connections (clamped to `1..=MAX_POOL_SIZE`).
    pub fn open(path: &Path, size: usize) -> LoraResult<Self> {
        Self::open_with(path, size, &StorageConfig::default())
    }

    pub fn open_with(path: &Path, size: usize, config: &StorageConfig) -> LoraResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conns = (0..Self::clamp(size))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags)
                    .map_err(|e| to_storage_err(e.to_string()))?;
                conn.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
                    .map_err(|e| to_storage_err(e.to_string()))?;
                Ok(Mutex::new(conn))
            })
            .collect::<LoraResult<Vec<_>>>()?;
        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    /// Isolated in-memory connections; only useful for probing.
    pub fn open_in_memory(size: usize) -> LoraResult<Self> {
        let conns = (0..Self::clamp(size))
            .map(|_| {
                let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
                apply_pragmas(&conn, 0, false)?;
                Ok(Mutex::new(conn))
            })
            .collect::<LoraResult<Vec<_>>>()?;
        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    fn clamp(size: usize) -> usize {
        size.clamp(1, MAX_POOL_SIZE)
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }

    /// Run `f` on the next connection in rotation.
    pub fn with_conn<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let guard = self.conns[idx].lock().map_err(|e| {
            StorageError::LockPoisoned {
                message: e.to_string(),
            }
        })?;
        f(&guard)
    }
}
