//! v003: idempotency tokens.

use rusqlite::Connection;

use lora_core::errors::LoraResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LoraResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS idempotency_records (
            token               TEXT PRIMARY KEY,
            recorded_at         INTEGER NOT NULL,
            actor               TEXT NOT NULL,
            object_uuid         TEXT NOT NULL,
            registration_id     INTEGER NOT NULL,
            request_fingerprint TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
