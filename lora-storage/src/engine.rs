//! StorageEngine: owns the connection pool and the schema.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tracing::{debug, info};

use lora_core::config::StorageConfig;
use lora_core::errors::LoraResult;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::to_storage_err;

/// The durable store handle. Opened once, shared by reference, dropped at
/// shutdown.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// In-memory mode: readers would see their own empty databases, so reads
    /// go through the writer.
    in_memory: bool,
}

impl StorageEngine {
    /// Open a file-backed database with default settings and run migrations.
    pub fn open(path: &Path) -> LoraResult<Self> {
        Self::open_path(path, &StorageConfig::default())
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> LoraResult<Self> {
        Self::open_in_memory_with(&StorageConfig::default())
    }

    /// Open whatever `config.db_path` names, in-memory when unset.
    pub fn open_with_config(config: &StorageConfig) -> LoraResult<Self> {
        match &config.db_path {
            Some(path) => Self::open_path(path, config),
            None => Self::open_in_memory_with(config),
        }
    }

    pub fn open_path(path: &Path, config: &StorageConfig) -> LoraResult<Self> {
        // The writer creates the file; readers pick the schema up on their
        // next statement.
        let pool = ConnectionPool::open(path, config)?;
        pool.writer
            .with_conn_sync(|conn| migrations::run_migrations(conn).map(|_| ()))?;
        info!(path = %path.display(), readers = pool.readers.size(), "storage opened");
        Ok(Self {
            pool,
            in_memory: false,
        })
    }

    pub fn open_in_memory_with(config: &StorageConfig) -> LoraResult<Self> {
        let pool = ConnectionPool::open_in_memory(config)?;
        pool.writer
            .with_conn_sync(|conn| migrations::run_migrations(conn).map(|_| ()))?;
        debug!("in-memory storage opened");
        Ok(Self {
            pool,
            in_memory: true,
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Run `f` on the write connection.
    pub async fn with_writer<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.pool.writer.with_conn(f).await
    }

    /// Run `f` on a read connection (the writer when in-memory).
    pub fn read_sync<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T>,
    {
        if self.in_memory {
            self.pool.writer.with_conn_sync(f)
        } else {
            self.pool.readers.with_conn(f)
        }
    }

    /// Async read. File-backed reads run on the blocking pool; in-memory
    /// reads queue on the writer like any other access to it.
    pub async fn with_reader<F, T>(&self, f: F) -> LoraResult<T>
    where
        F: FnOnce(&Connection) -> LoraResult<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.in_memory {
            return self.pool.writer.with_conn(f).await;
        }
        let readers = Arc::clone(&self.pool.readers);
        tokio::task::spawn_blocking(move || readers.with_conn(f))
            .await
            .map_err(|e| to_storage_err(format!("read task failed: {e}")))?
    }

    /// Liveness probe.
    pub fn is_reachable(&self) -> bool {
        self.read_sync(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(|e| to_storage_err(e.to_string()))
        })
        .map(|one| one == 1)
        .unwrap_or(false)
    }
}
