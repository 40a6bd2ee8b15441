//! v001: objects, registrations, virkning.

use rusqlite::Connection;

use lora_core::errors::LoraResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LoraResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS objects (
            uuid        TEXT PRIMARY KEY,
            object_type TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_objects_type ON objects(object_type);

        -- reg_to = i64::MAX while the registration is open.
        CREATE TABLE IF NOT EXISTS registrations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            object_uuid TEXT NOT NULL REFERENCES objects(uuid),
            reg_from    INTEGER NOT NULL,
            reg_to      INTEGER NOT NULL,
            actor       TEXT NOT NULL,
            lifecycle   TEXT NOT NULL,
            operation   TEXT NOT NULL,
            note        TEXT,
            CHECK (reg_from < reg_to)
        );

        CREATE INDEX IF NOT EXISTS idx_registrations_object_time
            ON registrations(object_uuid, reg_from, reg_to);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_registrations_one_open
            ON registrations(object_uuid) WHERE reg_to = 9223372036854775807;

        CREATE TABLE IF NOT EXISTS virkning (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            registration_id INTEGER NOT NULL REFERENCES registrations(id),
            seq             INTEGER NOT NULL,
            kind            TEXT NOT NULL,
            field           TEXT NOT NULL,
            value           TEXT NOT NULL,
            valid_from      INTEGER NOT NULL,
            valid_to        INTEGER NOT NULL,
            note            TEXT,
            CHECK (valid_from < valid_to)
        );

        CREATE INDEX IF NOT EXISTS idx_virkning_registration
            ON virkning(registration_id, kind, field, valid_from);

        -- Closed registrations and their virkning are immutable.
        CREATE TRIGGER IF NOT EXISTS trg_registrations_closed_immutable
            BEFORE UPDATE ON registrations
            WHEN OLD.reg_to != 9223372036854775807
        BEGIN
            SELECT RAISE(ABORT, 'closed registration is immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_registrations_no_delete
            BEFORE DELETE ON registrations
        BEGIN
            SELECT RAISE(ABORT, 'registrations are never deleted');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_virkning_immutable
            BEFORE UPDATE ON virkning
        BEGIN
            SELECT RAISE(ABORT, 'virkning entries are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS trg_virkning_no_delete
            BEFORE DELETE ON virkning
        BEGIN
            SELECT RAISE(ABORT, 'virkning entries are immutable');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
