//! Idempotency token ledger.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use lora_core::errors::{LoraError, LoraResult};
use lora_core::models::{IdempotencyRecord, MutationOutcome, RegistrationId};

use crate::codec::{instant_from_sql, instant_to_sql, uuid_from_sql};
use crate::{is_unique_violation, map_sqlite_err};

const TABLE: &str = "idempotency_records";

/// Look a token up.
pub fn get_record(conn: &Connection, token: Uuid) -> LoraResult<Option<IdempotencyRecord>> {
    let raw = conn
        .query_row(
            "SELECT recorded_at, actor, object_uuid, registration_id, request_fingerprint
             FROM idempotency_records WHERE token = ?1",
            params![token.to_string()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .map_err(|e| map_sqlite_err("get idempotency record", e))?;

    let Some((recorded_at, actor, object_uuid, registration_id, request_fingerprint)) = raw else {
        return Ok(None);
    };

    Ok(Some(IdempotencyRecord {
        token,
        recorded_at: instant_from_sql(TABLE, recorded_at)?,
        actor: uuid_from_sql(TABLE, &actor)?,
        result: MutationOutcome {
            object_uuid: uuid_from_sql(TABLE, &object_uuid)?,
            registration_id: RegistrationId(registration_id),
        },
        request_fingerprint,
    }))
}

/// Store a token. A token that already exists yields `Conflict`.
pub fn insert_record(conn: &Connection, record: &IdempotencyRecord) -> LoraResult<()> {
    conn.execute(
        "INSERT INTO idempotency_records
            (token, recorded_at, actor, object_uuid, registration_id, request_fingerprint)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.token.to_string(),
            instant_to_sql(record.recorded_at),
            record.actor.to_string(),
            record.result.object_uuid.to_string(),
            record.result.registration_id.0,
            record.request_fingerprint,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LoraError::Conflict { token: record.token }
        } else {
            map_sqlite_err("insert idempotency record", e)
        }
    })?;
    Ok(())
}
