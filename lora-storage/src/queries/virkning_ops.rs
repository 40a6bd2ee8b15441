//! Virkning rows. Written once per registration, never updated.

use rusqlite::{params, Connection, Row};

use lora_core::errors::LoraResult;
use lora_core::models::{Interval, RegistrationId, VirkningEntry, VirkningValue};

use crate::codec::{bound_to_sql, corrupt, interval_from_sql};
use crate::{map_sqlite_err, to_storage_err};

const TABLE: &str = "virkning";

struct RawVirkning {
    seq: u32,
    field: String,
    value: String,
    valid_from: i64,
    valid_to: i64,
    note: Option<String>,
}

impl RawVirkning {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            seq: row.get(0)?,
            field: row.get(1)?,
            value: row.get(2)?,
            valid_from: row.get(3)?,
            valid_to: row.get(4)?,
            note: row.get(5)?,
        })
    }

    fn parse(self) -> LoraResult<VirkningEntry> {
        let value: VirkningValue = serde_json::from_str(&self.value)
            .map_err(|e| corrupt(TABLE, format!("value of '{}': {e}", self.field)))?;
        Ok(VirkningEntry {
            field: self.field,
            value,
            validity: interval_from_sql(TABLE, self.valid_from, self.valid_to)?,
            note: self.note,
            seq: self.seq,
        })
    }
}

/// Insert the complete entry set of a freshly opened registration.
pub fn insert_entries(
    conn: &Connection,
    registration_id: RegistrationId,
    entries: &[VirkningEntry],
) -> LoraResult<()> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO virkning
                (registration_id, seq, kind, field, value, valid_from, valid_to, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    for entry in entries {
        let value = serde_json::to_string(&entry.value)?;
        stmt.execute(params![
            registration_id.0,
            entry.seq,
            entry.kind().as_str(),
            entry.field,
            value,
            bound_to_sql(entry.validity.from()),
            bound_to_sql(entry.validity.to()),
            entry.note,
        ])
        .map_err(|e| map_sqlite_err("insert virkning", e))?;
    }
    Ok(())
}

/// All entries of a registration, in insertion order. Pieces of a split
/// entry share its sequence number.
pub fn get_entries(conn: &Connection, registration_id: RegistrationId) -> LoraResult<Vec<VirkningEntry>> {
    query_entries(
        conn,
        "SELECT seq, field, value, valid_from, valid_to, note
         FROM virkning WHERE registration_id = ?1
         ORDER BY seq ASC, id ASC",
        params![registration_id.0],
    )
}

/// Entries of a registration whose validity overlaps `range`, in insertion order.
pub fn get_entries_overlapping(
    conn: &Connection,
    registration_id: RegistrationId,
    range: &Interval,
) -> LoraResult<Vec<VirkningEntry>> {
    query_entries(
        conn,
        "SELECT seq, field, value, valid_from, valid_to, note
         FROM virkning
         WHERE registration_id = ?1 AND valid_from < ?3 AND ?2 < valid_to
         ORDER BY seq ASC, id ASC",
        params![
            registration_id.0,
            bound_to_sql(range.from()),
            bound_to_sql(range.to()),
        ],
    )
}

pub fn count_entries(conn: &Connection, registration_id: RegistrationId) -> LoraResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM virkning WHERE registration_id = ?1",
        params![registration_id.0],
        |row| row.get(0),
    )
    .map_err(|e| map_sqlite_err("count virkning", e))
}

fn query_entries(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> LoraResult<Vec<VirkningEntry>> {
    let mut stmt = conn.prepare_cached(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, RawVirkning::from_row)
        .map_err(|e| map_sqlite_err("query virkning", e))?;

    let mut entries = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| map_sqlite_err("read virkning row", e))?;
        entries.push(raw.parse()?);
    }
    Ok(entries)
}
