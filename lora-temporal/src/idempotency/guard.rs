//! Token ledger checks around a mutation.
//!
//! A known token returns its stored result without touching the store. An
//! unknown token is claimed inside the mutation's own transaction, so the
//! effect and the token land together or not at all. Of two concurrent first
//! uses, the second to commit sees the first's record and fails with
//! `Conflict`.

use std::future::Future;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use lora_core::errors::{LoraError, LoraResult};
use lora_core::models::{IdempotencyRecord, MutationOutcome};
use lora_storage::queries::idempotency_ops;
use lora_storage::StorageEngine;

/// A token a mutation intends to store alongside its effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyClaim {
    pub token: Uuid,
    pub actor: Uuid,
    /// blake3 fingerprint of the request payload.
    pub fingerprint: String,
}

impl IdempotencyClaim {
    pub fn into_record(self, recorded_at: DateTime<Utc>, result: MutationOutcome) -> IdempotencyRecord {
        IdempotencyRecord {
            token: self.token,
            recorded_at,
            actor: self.actor,
            result,
            request_fingerprint: self.fingerprint,
        }
    }
}

/// Run `operation` unless the claim's token already has a result.
///
/// `operation` receives the claim to store in its transaction.
pub async fn execute_once<F, Fut>(
    storage: &StorageEngine,
    claim: Option<IdempotencyClaim>,
    operation: F,
) -> LoraResult<MutationOutcome>
where
    F: FnOnce(Option<IdempotencyClaim>) -> Fut,
    Fut: Future<Output = LoraResult<MutationOutcome>>,
{
    if let Some(claim) = &claim {
        let probe = claim.clone();
        if let Some(outcome) = storage.with_reader(move |conn| lookup(conn, &probe)).await? {
            return Ok(outcome);
        }
    }
    operation(claim).await
}

/// Stored result for the claim's token, if any. Mismatching actor or payload
/// is logged; the stored result is returned regardless.
pub fn lookup(conn: &Connection, claim: &IdempotencyClaim) -> LoraResult<Option<MutationOutcome>> {
    let Some(record) = idempotency_ops::get_record(conn, claim.token)? else {
        return Ok(None);
    };
    if record.actor != claim.actor {
        warn!(
            token = %claim.token,
            stored_actor = %record.actor,
            presented_actor = %claim.actor,
            "idempotent replay by a different actor"
        );
    }
    if record.request_fingerprint != claim.fingerprint {
        warn!(token = %claim.token, "idempotent replay with a different payload");
    }
    debug!(token = %claim.token, object = %record.result.object_uuid, "idempotent replay");
    Ok(Some(record.result))
}

pub fn get_by_token(conn: &Connection, token: Uuid) -> LoraResult<Option<IdempotencyRecord>> {
    idempotency_ops::get_record(conn, token)
}

/// Inside the mutation transaction: fail with `Conflict` if another request
/// stored the token since `lookup`.
pub fn ensure_unclaimed(conn: &Connection, token: Uuid) -> LoraResult<()> {
    if idempotency_ops::get_record(conn, token)?.is_some() {
        return Err(LoraError::Conflict { token });
    }
    Ok(())
}

/// Inside the mutation transaction: store the token with its result.
pub fn store_claim(
    conn: &Connection,
    claim: IdempotencyClaim,
    recorded_at: DateTime<Utc>,
    result: MutationOutcome,
) -> LoraResult<()> {
    idempotency_ops::insert_record(conn, &claim.into_record(recorded_at, result))
}
