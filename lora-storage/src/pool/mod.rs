//! Connection management: one serialized writer, a round-robin read pool.

mod pragmas;
mod read_pool;
mod write_connection;

use std::path::Path;
use std::sync::Arc;

use lora_core::config::StorageConfig;
use lora_core::errors::LoraResult;

pub use pragmas::apply_pragmas;
pub use read_pool::{ReadPool, DEFAULT_POOL_SIZE, MAX_POOL_SIZE};
pub use write_connection::WriteConnection;

/// Writer + readers over one database.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Arc<ReadPool>,
}

impl ConnectionPool {
    /// Open a file-backed pool.
    pub fn open(path: &Path, config: &StorageConfig) -> LoraResult<Self> {
        let writer = WriteConnection::open_with(path, config)?;
        let readers = ReadPool::open_with(path, config.read_pool_size, config)?;
        Ok(Self {
            writer: Arc::new(writer),
            readers: Arc::new(readers),
        })
    }

    /// Open an in-memory pool. Each read connection is a separate, empty
    /// database; reads must be routed through the writer.
    pub fn open_in_memory(config: &StorageConfig) -> LoraResult<Self> {
        let writer = WriteConnection::open_in_memory_with(config)?;
        let readers = ReadPool::open_in_memory(config.read_pool_size)?;
        Ok(Self {
            writer: Arc::new(writer),
            readers: Arc::new(readers),
        })
    }
}
