//! Point queries.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use lora_core::errors::{LoraError, LoraResult};
use lora_core::models::{Lifecycle, Registration, TimeBound, View};
use lora_storage::queries::{registration_ops, virkning_ops};

use crate::virkning::resolve_at;

/// The object as currently registered, valid at `validity_time`.
pub fn get_current(conn: &Connection, uuid: Uuid, validity_time: DateTime<Utc>) -> LoraResult<Option<View>> {
    let registration = registration_ops::get_open_registration(conn, uuid)?;
    view_of(conn, registration, validity_time)
}

/// The object as registered at `registration_time`, valid at `validity_time`.
/// `None` when no registration covers the point or the covering one is deleted.
pub fn get_at(
    conn: &Connection,
    uuid: Uuid,
    registration_time: DateTime<Utc>,
    validity_time: DateTime<Utc>,
) -> LoraResult<Option<View>> {
    let registration = registration_ops::get_registration_at(conn, uuid, registration_time)?;
    view_of(conn, registration, validity_time)
}

/// Whether a non-deleted registration covers `registration_time`
/// (the open registration when `None`).
pub fn exists(conn: &Connection, uuid: Uuid, registration_time: Option<DateTime<Utc>>) -> LoraResult<bool> {
    let registration = match registration_time {
        Some(at) => registration_ops::get_registration_at(conn, uuid, at)?,
        None => registration_ops::get_open_registration(conn, uuid)?,
    };
    Ok(registration.is_some_and(|r| r.lifecycle != Lifecycle::Deleted))
}

/// Full registration history, ascending. Deleted registrations included.
pub fn registrations(conn: &Connection, uuid: Uuid) -> LoraResult<Vec<Registration>> {
    let history = registration_ops::get_registrations(conn, uuid)?;
    if history.is_empty() {
        return Err(LoraError::NotFound { uuid });
    }
    Ok(history)
}

/// Resolve a registration's entries at `validity_time`.
pub(crate) fn resolve_view(
    conn: &Connection,
    registration: Registration,
    validity_time: DateTime<Utc>,
) -> LoraResult<View> {
    let at = TimeBound::At(validity_time);
    let entries = resolve_at(&virkning_ops::get_entries(conn, registration.id)?, at);
    Ok(View {
        object_uuid: registration.object_uuid,
        object_type: registration.object_type,
        lifecycle: registration.lifecycle,
        validity_time: at,
        entries,
        registration,
    })
}

fn view_of(
    conn: &Connection,
    registration: Option<Registration>,
    validity_time: DateTime<Utc>,
) -> LoraResult<Option<View>> {
    match registration {
        Some(r) if r.lifecycle != Lifecycle::Deleted => {
            debug!(object = %r.object_uuid, registration = %r.id, "resolving view");
            resolve_view(conn, r, validity_time).map(Some)
        }
        _ => Ok(None),
    }
}
