//! Virkning (validity-time) entries: the time-sliced values a registration carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interval::Interval;
use crate::errors::LoraError;

/// The three families of time-sliced values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirkningKind {
    Attribute,
    State,
    Relation,
}

impl VirkningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VirkningKind::Attribute => "attribute",
            VirkningKind::State => "state",
            VirkningKind::Relation => "relation",
        }
    }
}

impl fmt::Display for VirkningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VirkningKind {
    type Err = LoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attribute" => Ok(VirkningKind::Attribute),
            "state" => Ok(VirkningKind::State),
            "relation" => Ok(VirkningKind::Relation),
            other => Err(LoraError::ValidationError(format!(
                "unknown virkning kind: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VirkningValue {
    /// Scalar or structured property.
    Attribute(serde_json::Value),
    /// Enumerated lifecycle flag, e.g. `Published`.
    State(String),
    /// Reference to another object.
    Relation { target: Uuid, role: Option<String> },
}

impl VirkningValue {
    pub fn kind(&self) -> VirkningKind {
        match self {
            VirkningValue::Attribute(_) => VirkningKind::Attribute,
            VirkningValue::State(_) => VirkningKind::State,
            VirkningValue::Relation { .. } => VirkningKind::Relation,
        }
    }
}

/// One value of one field over one validity interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirkningEntry {
    pub field: String,
    pub value: VirkningValue,
    pub validity: Interval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Insertion order within the owning registration; assigned on placement.
    #[serde(default)]
    pub seq: u32,
}

impl VirkningEntry {
    pub fn attribute(field: &str, value: serde_json::Value, validity: Interval) -> Self {
        Self::new(field, VirkningValue::Attribute(value), validity)
    }

    pub fn state(field: &str, value: &str, validity: Interval) -> Self {
        Self::new(field, VirkningValue::State(value.to_string()), validity)
    }

    pub fn relation(field: &str, target: Uuid, role: Option<&str>, validity: Interval) -> Self {
        Self::new(
            field,
            VirkningValue::Relation {
                target,
                role: role.map(str::to_string),
            },
            validity,
        )
    }

    fn new(field: &str, value: VirkningValue, validity: Interval) -> Self {
        Self {
            field: field.to_string(),
            value,
            validity,
            note: None,
            seq: 0,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn kind(&self) -> VirkningKind {
        self.value.kind()
    }

    /// Identity of the time line this entry belongs to.
    pub fn key(&self) -> (VirkningKind, &str) {
        (self.kind(), self.field.as_str())
    }

    pub fn same_field(&self, other: &VirkningEntry) -> bool {
        self.key() == other.key()
    }
}
