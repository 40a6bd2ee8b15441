//! v002: append-only audit log.

use rusqlite::Connection;

use lora_core::errors::LoraResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LoraResult<()> {
    conn.execute_batch(
        "
        -- No foreign key on object_uuid: legacy rows may predate the object.
        CREATE TABLE IF NOT EXISTS audit_log (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            object_uuid           TEXT NOT NULL,
            actor                 TEXT NOT NULL,
            recorded_at           INTEGER NOT NULL,
            operation             TEXT NOT NULL,
            registration_id       INTEGER,
            prior_registration_id INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_audit_object_time
            ON audit_log(object_uuid, recorded_at, id);
        CREATE INDEX IF NOT EXISTS idx_audit_actor
            ON audit_log(actor, recorded_at);
        CREATE INDEX IF NOT EXISTS idx_audit_time
            ON audit_log(recorded_at);

        CREATE TRIGGER IF NOT EXISTS trg_audit_no_update
            BEFORE UPDATE ON audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit log is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_audit_no_delete
            BEFORE DELETE ON audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit log is append-only');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
