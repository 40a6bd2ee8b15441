//! Payload validation against the object kind's schema.

use lora_core::errors::{LoraError, LoraResult, TemporalError};
use lora_core::models::{
    Interval, ObjectKind, ObjectSchema, VirkningChange, VirkningEntry, VirkningKind,
};
use lora_storage::codec::bound_to_storage_precision;

/// Every entry names a field the kind declares, with an allowed value.
pub fn validate_entries(kind: ObjectKind, entries: &[VirkningEntry]) -> LoraResult<()> {
    let schema = kind.schema();
    entries.iter().try_for_each(|e| schema.validate(kind, e))
}

/// No two entries of the same (kind, field) overlap.
pub fn validate_disjoint(entries: &[VirkningEntry]) -> LoraResult<()> {
    let mut sorted: Vec<&VirkningEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        a.key()
            .cmp(&b.key())
            .then(a.validity.from().cmp(&b.validity.from()))
    });
    // Sorted by start, any overlap shows up between neighbours.
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.same_field(b) && a.validity.overlaps(&b.validity) {
            return Err(TemporalError::OverlappingVirkning {
                kind: a.kind().to_string(),
                field: a.field.clone(),
                detail: format!("{} overlaps {}", a.validity, b.validity),
            }
            .into());
        }
    }
    Ok(())
}

/// Size and schema checks for an update's change list.
pub fn validate_changes(kind: ObjectKind, changes: &[VirkningChange], max: usize) -> LoraResult<()> {
    validate_count(changes.len(), max)?;
    let schema = kind.schema();
    for change in changes {
        match change {
            VirkningChange::Set { entry } => schema.validate(kind, entry)?,
            VirkningChange::Terminate { kind: vk, field, .. } => {
                if !declares(schema, *vk, field) {
                    return Err(LoraError::ValidationError(format!(
                        "{kind} has no {vk} '{field}'"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Round validity bounds up to storage precision. An interval left without
/// a storable instant is rejected.
pub fn normalize_entries(entries: &[VirkningEntry]) -> LoraResult<Vec<VirkningEntry>> {
    entries.iter().map(normalize_entry).collect()
}

pub fn normalize_changes(changes: &[VirkningChange]) -> LoraResult<Vec<VirkningChange>> {
    changes
        .iter()
        .map(|change| match change {
            VirkningChange::Set { entry } => Ok(VirkningChange::Set {
                entry: normalize_entry(entry)?,
            }),
            VirkningChange::Terminate { kind, field, at } => Ok(VirkningChange::Terminate {
                kind: *kind,
                field: field.clone(),
                at: bound_to_storage_precision(*at),
            }),
        })
        .collect()
}

fn normalize_entry(entry: &VirkningEntry) -> LoraResult<VirkningEntry> {
    let from = bound_to_storage_precision(entry.validity.from());
    let to = bound_to_storage_precision(entry.validity.to());
    let validity = Interval::new(from, to).map_err(|_| {
        LoraError::ValidationError(format!(
            "validity {} of '{}' is narrower than one microsecond",
            entry.validity, entry.field
        ))
    })?;
    Ok(VirkningEntry {
        validity,
        ..entry.clone()
    })
}

pub fn validate_count(count: usize, max: usize) -> LoraResult<()> {
    if count > max {
        return Err(LoraError::ValidationError(format!(
            "{count} virkning changes exceed the limit of {max}"
        )));
    }
    Ok(())
}

fn declares(schema: &ObjectSchema, kind: VirkningKind, field: &str) -> bool {
    match kind {
        VirkningKind::Attribute => schema.attributes.contains(&field),
        VirkningKind::State => schema.states.iter().any(|s| s.name == field),
        VirkningKind::Relation => schema.relations.contains(&field),
    }
}
