//! Idempotency ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::mutation::MutationOutcome;
use crate::errors::LoraResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub token: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub actor: Uuid,
    pub result: MutationOutcome,
    /// blake3 hex digest of the request payload that first used the token.
    pub request_fingerprint: String,
}

/// Fingerprint a request payload for replay comparison.
pub fn fingerprint<T: Serialize>(payload: &T) -> LoraResult<String> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
