//! Audit ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::registration::{OperationKind, RegistrationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(pub i64);

/// Immutable record of one accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub object_uuid: Uuid,
    pub actor: Uuid,
    /// Wall-clock time of the commit, not the mutation's effective time.
    pub recorded_at: DateTime<Utc>,
    pub operation: OperationKind,
    /// Registration opened by the mutation. Empty for legacy rows.
    pub registration_id: Option<RegistrationId>,
    /// Registration the mutation closed. Empty for creates and legacy rows.
    pub prior_registration_id: Option<RegistrationId>,
}
