//! The single write connection.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rusqlite::Connection;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Mutex;

use lora_core::config::StorageConfig;
use lora_core::errors::{LoraError, LoraResult};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Serializes every write through one connection.
///
/// Async callers queue on a tokio mutex for at most `write_timeout`, then run
/// their closure on the blocking pool. Sync callers poll for the lock under
/// the same deadline, so neither path can wait forever.
pub struct WriteConnection {
    conn: Arc<Mutex<Connection>>,
    write_timeout: Duration,
}

impl WriteConnection {
    /// Open with default settings.
    pub fn open(path: &Path) -> LoraResult<Self> {
        Self::open_with(path, &StorageConfig::default())
    }

    pub fn open_with(path: &Path, config: &StorageConfig) -> LoraResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config.busy_timeout_ms, true)?;
        Ok(Self::wrap(conn, config))
    }

    pub fn open_in_memory() -> LoraResult<Self> {
        Self::open_in_memory_with(&StorageConfig::default())
    }

    pub fn open_in_memory_with(config: &StorageConfig) -> LoraResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config.busy_timeout_ms, false)?;
        Ok(Self::wrap(conn, config))
    }

    fn wrap(conn: Connection, config: &StorageConfig) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            write_timeout: Duration::from_millis(config.write_timeout_ms),
        }
    }

    /// Run `f` with exclusive access to the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let guard = tokio::time::timeout(self.write_timeout, Arc::clone(&self.conn).lock_owned())
            .await
            .map_err(|_| LoraError::StorageTimeout {
                operation: "acquire write connection".to_string(),
            })?;

        tokio::task::spawn_blocking(move || f(&guard))
            .await
            .map_err(|e| to_storage_err(format!("write task failed: {e}")))?
    }

    /// Blocking variant for non-async callers. On a multi-thread runtime the
    /// wait moves off the worker via `block_in_place`; on a current-thread
    /// runtime it still blocks the thread until the lock frees or times out.
    pub fn with_conn_sync<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T>,
    {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.poll_lock(f))
            }
            _ => self.poll_lock(f),
        }
    }

    fn poll_lock<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T>,
    {
        let deadline = Instant::now() + self.write_timeout;
        loop {
            if let Ok(guard) = self.conn.try_lock() {
                return f(&guard);
            }
            if Instant::now() >= deadline {
                return Err(LoraError::StorageTimeout {
                    operation: "acquire write connection".to_string(),
                });
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
