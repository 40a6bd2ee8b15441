//! Range queries along validity time.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use lora_core::errors::LoraResult;
use lora_core::models::{Interval, Lifecycle, RangeView};
use lora_storage::queries::{registration_ops, virkning_ops};

use crate::virkning::overlapping;

/// Every entry of the registration at `registration_time` that overlaps
/// `validity`. `None` under the same rules as `get_at`.
pub fn get_range(
    conn: &Connection,
    uuid: Uuid,
    registration_time: DateTime<Utc>,
    validity: &Interval,
) -> LoraResult<Option<RangeView>> {
    let Some(registration) = registration_ops::get_registration_at(conn, uuid, registration_time)? else {
        return Ok(None);
    };
    if registration.lifecycle == Lifecycle::Deleted {
        return Ok(None);
    }

    let stored = virkning_ops::get_entries_overlapping(conn, registration.id, validity)?;
    Ok(Some(RangeView {
        object_uuid: registration.object_uuid,
        object_type: registration.object_type,
        range: *validity,
        entries: overlapping(&stored, validity),
        registration,
    }))
}
