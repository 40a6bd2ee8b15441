//! Append-only audit ledger over `audit_ops`.
//!
//! Entries are written inside the mutation's transaction; a failed write
//! aborts the whole mutation.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use lora_core::errors::{LoraResult, TemporalError};
use lora_core::models::{AuditEntry, AuditEntryId, OperationKind, RegistrationId};
use lora_storage::queries::audit_ops::{self, NewAuditEntry};

/// Append an entry for an accepted mutation.
pub fn record(
    conn: &Connection,
    object_uuid: Uuid,
    actor: Uuid,
    operation: OperationKind,
    recorded_at: DateTime<Utc>,
    registration_id: RegistrationId,
    prior_registration_id: Option<RegistrationId>,
) -> LoraResult<AuditEntryId> {
    audit_ops::insert_audit_entry(
        conn,
        &NewAuditEntry {
            object_uuid,
            actor,
            recorded_at,
            operation,
            registration_id: Some(registration_id),
            prior_registration_id,
        },
    )
}

/// Append an entry carried over from a system without structured
/// registrations. Both registration references stay empty.
pub fn record_legacy(
    conn: &Connection,
    object_uuid: Uuid,
    actor: Uuid,
    recorded_at: DateTime<Utc>,
) -> LoraResult<AuditEntryId> {
    audit_ops::insert_audit_entry(
        conn,
        &NewAuditEntry {
            object_uuid,
            actor,
            recorded_at,
            operation: OperationKind::Legacy,
            registration_id: None,
            prior_registration_id: None,
        },
    )
}

/// Entries for one object, ascending by timestamp (ties by id).
pub fn history(conn: &Connection, object_uuid: Uuid) -> LoraResult<Vec<AuditEntry>> {
    audit_ops::query_by_object(conn, object_uuid)
}

pub fn by_actor(conn: &Connection, actor: Uuid) -> LoraResult<Vec<AuditEntry>> {
    audit_ops::query_by_actor(conn, actor)
}

/// Entries recorded in `[from, to)`.
pub fn in_range(conn: &Connection, from: DateTime<Utc>, to: DateTime<Utc>) -> LoraResult<Vec<AuditEntry>> {
    if from >= to {
        return Err(TemporalError::InvalidInterval {
            from: from.to_rfc3339(),
            to: to.to_rfc3339(),
        }
        .into());
    }
    audit_ops::query_by_time_range(conn, from, to)
}
