//! Registrations: the transaction-time history of an object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interval::Interval;
use super::object_kind::ObjectKind;
use crate::errors::{LoraError, TemporalError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub i64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object lifecycle as of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Created,
    Passive,
    Deleted,
}

/// What kind of mutation produced a registration or audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Passivate,
    Delete,
    /// Audit rows carried over from systems without structured registrations.
    Legacy,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Created => "created",
            Lifecycle::Passive => "passive",
            Lifecycle::Deleted => "deleted",
        }
    }

    /// Lifecycle after applying `op` to an object in this state.
    ///
    /// `Deleted` is terminal; callers map that case to `AlreadyDeleted`
    /// before reaching here, so the error is a safety net.
    pub fn transition(self, op: OperationKind) -> Result<Lifecycle, TemporalError> {
        let next = match (self, op) {
            (Lifecycle::Deleted, _) | (_, OperationKind::Create) | (_, OperationKind::Legacy) => {
                return Err(TemporalError::InvalidLifecycleTransition {
                    from: self.to_string(),
                    to: op.as_str().to_string(),
                })
            }
            (_, OperationKind::Update) => Lifecycle::Created,
            (_, OperationKind::Passivate) => Lifecycle::Passive,
            (_, OperationKind::Delete) => Lifecycle::Deleted,
        };
        Ok(next)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifecycle {
    type Err = LoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Lifecycle::Created),
            "passive" => Ok(Lifecycle::Passive),
            "deleted" => Ok(Lifecycle::Deleted),
            other => Err(LoraError::ValidationError(format!("unknown lifecycle: {other}"))),
        }
    }
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Passivate => "passivate",
            OperationKind::Delete => "delete",
            OperationKind::Legacy => "legacy",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = LoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(OperationKind::Create),
            "update" => Ok(OperationKind::Update),
            "passivate" => Ok(OperationKind::Passivate),
            "delete" => Ok(OperationKind::Delete),
            "legacy" => Ok(OperationKind::Legacy),
            other => Err(LoraError::ValidationError(format!("unknown operation: {other}"))),
        }
    }
}

/// One row of an object's transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub object_uuid: Uuid,
    pub object_type: ObjectKind,
    /// Registration-time interval; open while this is the current registration.
    pub period: Interval,
    pub actor: Uuid,
    pub lifecycle: Lifecycle,
    pub operation: OperationKind,
    pub note: Option<String>,
}

impl Registration {
    pub fn is_current(&self) -> bool {
        self.period.is_open()
    }
}
