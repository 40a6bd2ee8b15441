//! Prepare phase: read the head, validate, compute the successor.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use lora_core::errors::{LoraError, LoraResult, TemporalError};
use lora_core::models::{
    Lifecycle, ObjectKind, Operation, OperationKind, Registration, TimeBound, VirkningChange,
    VirkningEntry,
};
use lora_storage::map_sqlite_err;
use lora_storage::queries::{registration_ops, virkning_ops};

use super::PendingRegistration;
use crate::virkning::validation::validate_count;
use crate::virkning::{
    normalize_changes, normalize_entries, validate_changes, validate_disjoint, validate_entries,
    EntrySet,
};

/// Prepare any operation. Every read happens inside one deferred
/// transaction so the head and its entries come from the same snapshot.
pub fn prepare(
    conn: &Connection,
    object_type: ObjectKind,
    actor: Uuid,
    operation: &Operation,
    effective_time: DateTime<Utc>,
    max_changes: usize,
) -> LoraResult<PendingRegistration> {
    let snapshot = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)
        .map_err(|e| map_sqlite_err("begin read snapshot", e))?;

    let pending = match operation {
        Operation::Create { uuid, values, note } => prepare_create(
            &snapshot,
            object_type,
            actor,
            *uuid,
            values,
            note.as_deref(),
            effective_time,
            max_changes,
        ),
        Operation::Update { uuid, changes, note } => prepare_update(
            &snapshot,
            object_type,
            actor,
            *uuid,
            changes,
            note.as_deref(),
            effective_time,
            max_changes,
        ),
        Operation::Passivate { uuid, note } => {
            prepare_passivate(&snapshot, object_type, actor, *uuid, note.as_deref(), effective_time)
        }
        Operation::Delete { uuid, note } => {
            prepare_delete(&snapshot, object_type, actor, *uuid, note.as_deref(), effective_time)
        }
    }?;

    // Read-only: dropping the snapshot rolls it back.
    drop(snapshot);
    debug!(
        object = %pending.object_uuid,
        operation = %pending.operation,
        entries = pending.entries.len(),
        "mutation prepared"
    );
    Ok(pending)
}

/// First registration of a new object: `[effective_time, +inf)`, `Created`.
#[allow(clippy::too_many_arguments)]
pub fn prepare_create(
    conn: &Connection,
    object_type: ObjectKind,
    actor: Uuid,
    uuid: Option<Uuid>,
    values: &[VirkningEntry],
    note: Option<&str>,
    effective_time: DateTime<Utc>,
    max_changes: usize,
) -> LoraResult<PendingRegistration> {
    validate_count(values.len(), max_changes)?;
    let values = normalize_entries(values)?;
    validate_entries(object_type, &values)?;
    validate_disjoint(&values)?;

    let object_uuid = match uuid {
        Some(uuid) => {
            if registration_ops::get_object_type(conn, uuid)?.is_some() {
                return Err(LoraError::ValidationError(format!("object {uuid} already exists")));
            }
            uuid
        }
        None => Uuid::new_v4(),
    };

    let mut set = EntrySet::new();
    for value in values {
        set.place(value);
    }

    Ok(PendingRegistration {
        object_uuid,
        object_type,
        base: None,
        effective_time,
        actor,
        lifecycle: Lifecycle::Created,
        operation: OperationKind::Create,
        note: note.map(str::to_string),
        entries: set.into_entries(),
    })
}

/// Carry the head's entries forward with `changes` applied.
#[allow(clippy::too_many_arguments)]
pub fn prepare_update(
    conn: &Connection,
    object_type: ObjectKind,
    actor: Uuid,
    uuid: Uuid,
    changes: &[VirkningChange],
    note: Option<&str>,
    effective_time: DateTime<Utc>,
    max_changes: usize,
) -> LoraResult<PendingRegistration> {
    validate_changes(object_type, changes, max_changes)?;
    let changes = normalize_changes(changes)?;
    let (head, mut set) = load_head(conn, object_type, uuid, effective_time)?;
    for change in &changes {
        set.apply(change);
    }
    successor(head, OperationKind::Update, actor, note, effective_time, set)
}

/// Carry the head's entries forward, each ended at `effective_time`.
pub fn prepare_passivate(
    conn: &Connection,
    object_type: ObjectKind,
    actor: Uuid,
    uuid: Uuid,
    note: Option<&str>,
    effective_time: DateTime<Utc>,
) -> LoraResult<PendingRegistration> {
    let (head, mut set) = load_head(conn, object_type, uuid, effective_time)?;
    set.clip_to(effective_time);
    successor(head, OperationKind::Passivate, actor, note, effective_time, set)
}

/// Terminal registration. Entries are carried forward unchanged so the
/// deleted registration still records what the object held.
pub fn prepare_delete(
    conn: &Connection,
    object_type: ObjectKind,
    actor: Uuid,
    uuid: Uuid,
    note: Option<&str>,
    effective_time: DateTime<Utc>,
) -> LoraResult<PendingRegistration> {
    let (head, set) = load_head(conn, object_type, uuid, effective_time)?;
    successor(head, OperationKind::Delete, actor, note, effective_time, set)
}

/// The open registration and its entries, after the checks every
/// non-create operation shares.
fn load_head(
    conn: &Connection,
    object_type: ObjectKind,
    uuid: Uuid,
    effective_time: DateTime<Utc>,
) -> LoraResult<(Registration, EntrySet)> {
    let stored_type = registration_ops::get_object_type(conn, uuid)?
        .ok_or(LoraError::NotFound { uuid })?;
    if stored_type != object_type {
        return Err(LoraError::ValidationError(format!(
            "object {uuid} is a {stored_type}, not a {object_type}"
        )));
    }

    let head = registration_ops::get_open_registration(conn, uuid)?
        .ok_or(LoraError::NotFound { uuid })?;
    if head.lifecycle == Lifecycle::Deleted {
        return Err(LoraError::AlreadyDeleted { uuid });
    }
    if TimeBound::At(effective_time) <= head.period.from() {
        return Err(TemporalError::RegistrationTimeRegression {
            open_from: head.period.from().to_string(),
            requested: effective_time.to_rfc3339(),
        }
        .into());
    }

    let entries = virkning_ops::get_entries(conn, head.id)?;
    Ok((head, EntrySet::from_entries(entries)))
}

fn successor(
    head: Registration,
    operation: OperationKind,
    actor: Uuid,
    note: Option<&str>,
    effective_time: DateTime<Utc>,
    set: EntrySet,
) -> LoraResult<PendingRegistration> {
    let lifecycle = head.lifecycle.transition(operation)?;
    Ok(PendingRegistration {
        object_uuid: head.object_uuid,
        object_type: head.object_type,
        base: Some(head.id),
        effective_time,
        actor,
        lifecycle,
        operation,
        note: note.map(str::to_string),
        entries: set.into_entries(),
    })
}
