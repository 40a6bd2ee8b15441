use std::time::Duration;

use rusqlite::Connection;

use lora_core::errors::LoraResult;

use crate::to_storage_err;

/// Per-connection settings. WAL lets readers keep their snapshot while the
/// writer commits; the busy timeout bounds how long a connection waits on
/// another process's lock before surfacing `SQLITE_BUSY`.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64, file_backed: bool) -> LoraResult<()> {
    if file_backed {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| to_storage_err(format!("journal_mode: {e}")))?;
    }
    conn.execute_batch(
        "PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;",
    )
    .map_err(|e| to_storage_err(format!("pragmas: {e}")))?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(format!("busy_timeout: {e}")))?;
    Ok(())
}
