//! Resolved read models returned by the query layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interval::{Interval, TimeBound};
use super::object_kind::ObjectKind;
use super::registration::{Lifecycle, Registration};
use super::virkning::{VirkningEntry, VirkningKind, VirkningValue};

/// An object as seen at one registration time and one validity time:
/// at most one entry per (kind, field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub object_uuid: Uuid,
    pub object_type: ObjectKind,
    pub lifecycle: Lifecycle,
    pub registration: Registration,
    pub validity_time: TimeBound,
    pub entries: Vec<VirkningEntry>,
}

impl View {
    pub fn entry(&self, kind: VirkningKind, field: &str) -> Option<&VirkningEntry> {
        self.entries.iter().find(|e| e.key() == (kind, field))
    }

    pub fn attribute(&self, field: &str) -> Option<&serde_json::Value> {
        match &self.entry(VirkningKind::Attribute, field)?.value {
            VirkningValue::Attribute(v) => Some(v),
            _ => None,
        }
    }

    pub fn state(&self, field: &str) -> Option<&str> {
        match &self.entry(VirkningKind::State, field)?.value {
            VirkningValue::State(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn relation(&self, field: &str) -> Option<Uuid> {
        match &self.entry(VirkningKind::Relation, field)?.value {
            VirkningValue::Relation { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Every entry of one registration overlapping a validity range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeView {
    pub object_uuid: Uuid,
    pub object_type: ObjectKind,
    pub registration: Registration,
    pub range: Interval,
    /// Ordered by (kind, field, validity start).
    pub entries: Vec<VirkningEntry>,
}
