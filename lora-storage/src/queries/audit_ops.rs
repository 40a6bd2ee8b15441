//! Audit log insert, query by object/time/actor.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use lora_core::errors::LoraResult;
use lora_core::models::{AuditEntry, AuditEntryId, OperationKind, RegistrationId};

use crate::codec::{instant_from_sql, instant_to_sql, uuid_from_sql};
use crate::{map_sqlite_err, to_storage_err};

const TABLE: &str = "audit_log";

/// Fields of an audit entry about to be appended.
#[derive(Debug, Clone, Copy)]
pub struct NewAuditEntry {
    pub object_uuid: Uuid,
    pub actor: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub operation: OperationKind,
    pub registration_id: Option<RegistrationId>,
    pub prior_registration_id: Option<RegistrationId>,
}

/// Append an audit entry. Returns its id.
pub fn insert_audit_entry(conn: &Connection, entry: &NewAuditEntry) -> LoraResult<AuditEntryId> {
    conn.execute(
        "INSERT INTO audit_log
            (object_uuid, actor, recorded_at, operation, registration_id, prior_registration_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.object_uuid.to_string(),
            entry.actor.to_string(),
            instant_to_sql(entry.recorded_at),
            entry.operation.as_str(),
            entry.registration_id.map(|r| r.0),
            entry.prior_registration_id.map(|r| r.0),
        ],
    )
    .map_err(|e| map_sqlite_err("insert audit entry", e))?;
    Ok(AuditEntryId(conn.last_insert_rowid()))
}

/// Audit entries for one object, oldest first.
pub fn query_by_object(conn: &Connection, object_uuid: Uuid) -> LoraResult<Vec<AuditEntry>> {
    collect_audit_entries(
        conn,
        "SELECT id, object_uuid, actor, recorded_at, operation, registration_id, prior_registration_id
         FROM audit_log WHERE object_uuid = ?1
         ORDER BY recorded_at ASC, id ASC",
        params![object_uuid.to_string()],
    )
}

/// Audit entries recorded in `[from, to)`, oldest first.
pub fn query_by_time_range(
    conn: &Connection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> LoraResult<Vec<AuditEntry>> {
    collect_audit_entries(
        conn,
        "SELECT id, object_uuid, actor, recorded_at, operation, registration_id, prior_registration_id
         FROM audit_log WHERE recorded_at >= ?1 AND recorded_at < ?2
         ORDER BY recorded_at ASC, id ASC",
        params![instant_to_sql(from), instant_to_sql(to)],
    )
}

/// Audit entries by actor, oldest first.
pub fn query_by_actor(conn: &Connection, actor: Uuid) -> LoraResult<Vec<AuditEntry>> {
    collect_audit_entries(
        conn,
        "SELECT id, object_uuid, actor, recorded_at, operation, registration_id, prior_registration_id
         FROM audit_log WHERE actor = ?1
         ORDER BY recorded_at ASC, id ASC",
        params![actor.to_string()],
    )
}

pub fn count_by_object(conn: &Connection, object_uuid: Uuid) -> LoraResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM audit_log WHERE object_uuid = ?1",
        params![object_uuid.to_string()],
        |row| row.get(0),
    )
    .map_err(|e| map_sqlite_err("count audit entries", e))
}

type RawAudit = (i64, String, String, i64, String, Option<i64>, Option<i64>);

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawAudit> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn collect_audit_entries(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> LoraResult<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, raw_from_row)
        .map_err(|e| map_sqlite_err("query audit log", e))?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, object_uuid, actor, recorded_at, operation, registration_id, prior) =
            row.map_err(|e| map_sqlite_err("read audit row", e))?;

        entries.push(AuditEntry {
            id: AuditEntryId(id),
            object_uuid: uuid_from_sql(TABLE, &object_uuid)?,
            actor: uuid_from_sql(TABLE, &actor)?,
            recorded_at: instant_from_sql(TABLE, recorded_at)?,
            operation: operation.parse::<OperationKind>()?,
            registration_id: registration_id.map(RegistrationId),
            prior_registration_id: prior.map(RegistrationId),
        });
    }
    Ok(entries)
}
