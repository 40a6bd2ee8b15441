//! Registration engine.
//!
//! A mutation runs in two phases. `prepare` reads the head registration from
//! a read snapshot, validates, and computes the successor's entry set.
//! `commit` then CAS-closes that exact head on the write connection and
//! inserts the successor, its entries, the audit entry and the idempotency
//! record in one IMMEDIATE transaction.

pub mod commit;
pub mod prepare;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lora_core::models::{Lifecycle, ObjectKind, OperationKind, RegistrationId, VirkningEntry};

pub use commit::commit;
pub use prepare::{prepare, prepare_create, prepare_delete, prepare_passivate, prepare_update};

/// A registration computed but not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRegistration {
    pub object_uuid: Uuid,
    pub object_type: ObjectKind,
    /// The head observed at prepare time. `None` for creates.
    pub base: Option<RegistrationId>,
    pub effective_time: DateTime<Utc>,
    pub actor: Uuid,
    pub lifecycle: Lifecycle,
    pub operation: OperationKind,
    pub note: Option<String>,
    pub entries: Vec<VirkningEntry>,
}
