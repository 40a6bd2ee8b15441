//! Commit phase: one IMMEDIATE transaction on the write connection.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{error, info};

use lora_core::errors::{LoraError, LoraResult};
use lora_core::models::MutationOutcome;
use lora_storage::map_sqlite_err;
use lora_storage::queries::registration_ops::{self, NewRegistration};
use lora_storage::queries::virkning_ops;

use super::PendingRegistration;
use crate::audit;
use crate::idempotency::{self, IdempotencyClaim};

/// Write `pending` atomically.
///
/// The CAS closes the head observed at prepare time; if another mutation
/// closed it first nothing is written and the result is
/// `ConcurrentModification`. Any error rolls the whole transaction back.
pub fn commit(
    conn: &Connection,
    pending: &PendingRegistration,
    claim: Option<IdempotencyClaim>,
    recorded_at: DateTime<Utc>,
) -> LoraResult<MutationOutcome> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| map_sqlite_err("begin mutation", e))?;

    if let Some(claim) = &claim {
        idempotency::ensure_unclaimed(&tx, claim.token)?;
    }

    let uuid = pending.object_uuid;
    match pending.base {
        None => registration_ops::insert_object(&tx, uuid, pending.object_type, pending.effective_time)?,
        Some(base) => {
            if !registration_ops::close_registration(&tx, base, pending.effective_time)? {
                return Err(LoraError::ConcurrentModification {
                    uuid,
                    registration_id: base.0,
                });
            }
        }
    }

    let registration_id = registration_ops::insert_registration(
        &tx,
        &NewRegistration {
            object_uuid: uuid,
            from: pending.effective_time,
            actor: pending.actor,
            lifecycle: pending.lifecycle,
            operation: pending.operation,
            note: pending.note.as_deref(),
        },
    )?;
    virkning_ops::insert_entries(&tx, registration_id, &pending.entries)?;

    audit::record(
        &tx,
        uuid,
        pending.actor,
        pending.operation,
        recorded_at,
        registration_id,
        pending.base,
    )
    .map_err(|e| {
        error!(object = %uuid, operation = %pending.operation, error = %e, "audit write failed");
        LoraError::AuditWriteFailed {
            uuid,
            reason: e.to_string(),
        }
    })?;

    let outcome = MutationOutcome {
        object_uuid: uuid,
        registration_id,
    };
    if let Some(claim) = claim {
        idempotency::store_claim(&tx, claim, recorded_at, outcome)?;
    }

    tx.commit().map_err(|e| map_sqlite_err("commit mutation", e))?;

    info!(
        object = %uuid,
        object_type = %pending.object_type,
        operation = %pending.operation,
        registration = %registration_id,
        prior = ?pending.base.map(|b| b.0),
        "mutation committed"
    );
    Ok(outcome)
}
