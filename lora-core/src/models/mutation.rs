//! Mutation entry-point payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interval::TimeBound;
use super::object_kind::ObjectKind;
use super::registration::{OperationKind, RegistrationId};
use super::virkning::{VirkningEntry, VirkningKind};

/// A validity edit applied on top of the carried-forward entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VirkningChange {
    /// Insert, superseding whatever the field held over the entry's validity.
    Set { entry: VirkningEntry },
    /// End every entry of the field at `at`.
    Terminate {
        kind: VirkningKind,
        field: String,
        at: TimeBound,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    Create {
        /// Caller-chosen UUID; generated when absent.
        #[serde(default)]
        uuid: Option<Uuid>,
        values: Vec<VirkningEntry>,
        #[serde(default)]
        note: Option<String>,
    },
    Update {
        uuid: Uuid,
        changes: Vec<VirkningChange>,
        #[serde(default)]
        note: Option<String>,
    },
    Passivate {
        uuid: Uuid,
        #[serde(default)]
        note: Option<String>,
    },
    Delete {
        uuid: Uuid,
        #[serde(default)]
        note: Option<String>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Create { .. } => OperationKind::Create,
            Operation::Update { .. } => OperationKind::Update,
            Operation::Passivate { .. } => OperationKind::Passivate,
            Operation::Delete { .. } => OperationKind::Delete,
        }
    }

    /// The existing object a non-create operation targets.
    pub fn target(&self) -> Option<Uuid> {
        match self {
            Operation::Create { uuid, .. } => *uuid,
            Operation::Update { uuid, .. }
            | Operation::Passivate { uuid, .. }
            | Operation::Delete { uuid, .. } => Some(*uuid),
        }
    }
}

/// Everything the presentation layer hands the mutation entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub object_type: ObjectKind,
    /// Authenticated actor; resolved through the configured `ActorResolver`.
    #[serde(default)]
    pub actor: Option<Uuid>,
    pub operation: Operation,
    /// Registration time of the change; defaults to the clock's now.
    #[serde(default)]
    pub effective_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub idempotency_token: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub object_uuid: Uuid,
    pub registration_id: RegistrationId,
}
