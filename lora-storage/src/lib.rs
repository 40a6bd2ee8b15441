//! # lora-storage
//!
//! SQLite persistence layer for the LoRa bitemporal store.
//! Single write connection + read pool (WAL mode), forward-only migrations,
//! and one query module per table.

pub mod codec;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use lora_core::errors::StorageError;
use lora_core::LoraError;

/// Helper to convert a string message into a LoraError::StorageError.
pub fn to_storage_err(msg: String) -> LoraError {
    LoraError::StorageError(StorageError::SqliteError { message: msg })
}

/// Map a rusqlite error, turning lock contention into `StorageTimeout`.
pub fn map_sqlite_err(operation: &str, err: rusqlite::Error) -> LoraError {
    match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
            LoraError::StorageTimeout {
                operation: operation.to_string(),
            }
        }
        _ => to_storage_err(format!("{operation}: {err}")),
    }
}

/// True when the error is a UNIQUE / PRIMARY KEY violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
    )
}
