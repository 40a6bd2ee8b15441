//! Objects and their registrations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use lora_core::errors::{LoraError, LoraResult};
use lora_core::models::{Lifecycle, ObjectKind, OperationKind, Registration, RegistrationId};

use crate::codec::{instant_to_sql, interval_from_sql, uuid_from_sql, POS_INFINITY};
use crate::{is_unique_violation, map_sqlite_err, to_storage_err};

const TABLE: &str = "registrations";

const SELECT_REGISTRATION: &str = "
    SELECT r.id, r.object_uuid, o.object_type, r.reg_from, r.reg_to,
           r.actor, r.lifecycle, r.operation, r.note
    FROM registrations r
    JOIN objects o ON o.uuid = r.object_uuid";

/// Fields of a registration about to be opened.
#[derive(Debug, Clone)]
pub struct NewRegistration<'a> {
    pub object_uuid: Uuid,
    pub from: DateTime<Utc>,
    pub actor: Uuid,
    pub lifecycle: Lifecycle,
    pub operation: OperationKind,
    pub note: Option<&'a str>,
}

/// Raw registration row, before parsing.
struct RawRegistration {
    id: i64,
    object_uuid: String,
    object_type: String,
    reg_from: i64,
    reg_to: i64,
    actor: String,
    lifecycle: String,
    operation: String,
    note: Option<String>,
}

impl RawRegistration {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            object_uuid: row.get(1)?,
            object_type: row.get(2)?,
            reg_from: row.get(3)?,
            reg_to: row.get(4)?,
            actor: row.get(5)?,
            lifecycle: row.get(6)?,
            operation: row.get(7)?,
            note: row.get(8)?,
        })
    }

    fn parse(self) -> LoraResult<Registration> {
        Ok(Registration {
            id: RegistrationId(self.id),
            object_uuid: uuid_from_sql(TABLE, &self.object_uuid)?,
            object_type: self.object_type.parse()?,
            period: interval_from_sql(TABLE, self.reg_from, self.reg_to)?,
            actor: uuid_from_sql(TABLE, &self.actor)?,
            lifecycle: self.lifecycle.parse()?,
            operation: self.operation.parse()?,
            note: self.note,
        })
    }
}

/// Insert the durable object row. Fails with `ValidationError` if the UUID is taken.
pub fn insert_object(
    conn: &Connection,
    uuid: Uuid,
    kind: ObjectKind,
    created_at: DateTime<Utc>,
) -> LoraResult<()> {
    conn.execute(
        "INSERT INTO objects (uuid, object_type, created_at) VALUES (?1, ?2, ?3)",
        params![uuid.to_string(), kind.as_str(), instant_to_sql(created_at)],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LoraError::ValidationError(format!("object {uuid} already exists"))
        } else {
            map_sqlite_err("insert object", e)
        }
    })?;
    Ok(())
}

pub fn get_object_type(conn: &Connection, uuid: Uuid) -> LoraResult<Option<ObjectKind>> {
    let kind: Option<String> = conn
        .query_row(
            "SELECT object_type FROM objects WHERE uuid = ?1",
            params![uuid.to_string()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| map_sqlite_err("get object type", e))?;
    kind.map(|k| k.parse()).transpose()
}

/// Open a registration. Returns its id.
pub fn insert_registration(conn: &Connection, reg: &NewRegistration<'_>) -> LoraResult<RegistrationId> {
    conn.execute(
        "INSERT INTO registrations
            (object_uuid, reg_from, reg_to, actor, lifecycle, operation, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            reg.object_uuid.to_string(),
            instant_to_sql(reg.from),
            POS_INFINITY,
            reg.actor.to_string(),
            reg.lifecycle.as_str(),
            reg.operation.as_str(),
            reg.note,
        ],
    )
    .map_err(|e| map_sqlite_err("insert registration", e))?;
    Ok(RegistrationId(conn.last_insert_rowid()))
}

/// Compare-and-swap close: sets `reg_to = at` only if the registration is
/// still open. Returns `false` when another writer closed it first.
pub fn close_registration(conn: &Connection, id: RegistrationId, at: DateTime<Utc>) -> LoraResult<bool> {
    let changed = conn
        .execute(
            "UPDATE registrations SET reg_to = ?1
             WHERE id = ?2 AND reg_to = ?3 AND reg_from < ?1",
            params![instant_to_sql(at), id.0, POS_INFINITY],
        )
        .map_err(|e| map_sqlite_err("close registration", e))?;
    Ok(changed == 1)
}

/// The open registration of an object.
pub fn get_open_registration(conn: &Connection, uuid: Uuid) -> LoraResult<Option<Registration>> {
    query_one(
        conn,
        &format!("{SELECT_REGISTRATION} WHERE r.object_uuid = ?1 AND r.reg_to = ?2"),
        params![uuid.to_string(), POS_INFINITY],
    )
}

/// The registration whose registration-time interval contains `at`.
pub fn get_registration_at(
    conn: &Connection,
    uuid: Uuid,
    at: DateTime<Utc>,
) -> LoraResult<Option<Registration>> {
    query_one(
        conn,
        &format!("{SELECT_REGISTRATION} WHERE r.object_uuid = ?1 AND r.reg_from <= ?2 AND ?2 < r.reg_to"),
        params![uuid.to_string(), instant_to_sql(at)],
    )
}

/// Full registration history of an object, ascending by `reg_from`.
pub fn get_registrations(conn: &Connection, uuid: Uuid) -> LoraResult<Vec<Registration>> {
    query_many(
        conn,
        &format!("{SELECT_REGISTRATION} WHERE r.object_uuid = ?1 ORDER BY r.reg_from ASC"),
        params![uuid.to_string()],
    )
}

/// Every non-deleted registration covering `at`, optionally of one kind,
/// ordered by object UUID for stable iteration.
pub fn list_registrations_at(
    conn: &Connection,
    kind: Option<ObjectKind>,
    at: DateTime<Utc>,
) -> LoraResult<Vec<Registration>> {
    query_many(
        conn,
        &format!(
            "{SELECT_REGISTRATION}
             WHERE r.reg_from <= ?1 AND ?1 < r.reg_to
               AND r.lifecycle != 'deleted'
               AND (?2 IS NULL OR o.object_type = ?2)
             ORDER BY r.object_uuid ASC"
        ),
        params![instant_to_sql(at), kind.map(|k| k.as_str())],
    )
}

pub fn get_registration(conn: &Connection, id: RegistrationId) -> LoraResult<Option<Registration>> {
    query_one(conn, &format!("{SELECT_REGISTRATION} WHERE r.id = ?1"), params![id.0])
}

fn query_one(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> LoraResult<Option<Registration>> {
    let raw = conn
        .query_row(sql, params, RawRegistration::from_row)
        .optional()
        .map_err(|e| map_sqlite_err("query registration", e))?;
    raw.map(RawRegistration::parse).transpose()
}

fn query_many(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> LoraResult<Vec<Registration>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, RawRegistration::from_row)
        .map_err(|e| map_sqlite_err("query registrations", e))?;

    let mut registrations = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| map_sqlite_err("read registration row", e))?;
        registrations.push(raw.parse()?);
    }
    Ok(registrations)
}
