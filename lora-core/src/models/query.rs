//! Query entry-point payloads.
//!
//! The query context travels as an explicit parameter; nothing about a read
//! is kept in shared state between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::object_kind::ObjectKind;
use super::registration::Lifecycle;
use super::view::View;
use super::virkning::{VirkningKind, VirkningValue};

/// Points on both time axes; `None` means "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub registration_time: Option<DateTime<Utc>>,
    pub validity_time: Option<DateTime<Utc>>,
}

impl QueryContext {
    pub fn now() -> Self {
        Self::default()
    }

    pub fn at(registration_time: DateTime<Utc>, validity_time: DateTime<Utc>) -> Self {
        Self {
            registration_time: Some(registration_time),
            validity_time: Some(validity_time),
        }
    }

    pub fn valid_at(validity_time: DateTime<Utc>) -> Self {
        Self {
            registration_time: None,
            validity_time: Some(validity_time),
        }
    }

    /// Pin both axes, filling gaps with `now`.
    pub fn pin(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.registration_time.unwrap_or(now),
            self.validity_time.unwrap_or(now),
        )
    }
}

/// Predicate over a resolved view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    AttributeEquals { field: String, value: serde_json::Value },
    StateEquals { field: String, value: String },
    RelatesTo { field: String, target: Uuid },
    HasField { kind: VirkningKind, field: String },
}

impl Predicate {
    pub fn matches(&self, view: &View) -> bool {
        match self {
            Predicate::AttributeEquals { field, value } => view.attribute(field) == Some(value),
            Predicate::StateEquals { field, value } => view.state(field) == Some(value.as_str()),
            Predicate::RelatesTo { field, target } => view
                .entries
                .iter()
                .filter(|e| e.field == *field)
                .any(|e| matches!(&e.value, VirkningValue::Relation { target: t, .. } if t == target)),
            Predicate::HasField { kind, field } => view.entry(*kind, field).is_some(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    pub object_type: Option<ObjectKind>,
    /// Deleted objects are never returned regardless of this filter.
    pub lifecycle: Option<Lifecycle>,
    /// All predicates must hold.
    pub predicates: Vec<Predicate>,
}

impl SearchFilter {
    pub fn of_type(kind: ObjectKind) -> Self {
        Self {
            object_type: Some(kind),
            ..Self::default()
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, view: &View) -> bool {
        if let Some(lifecycle) = self.lifecycle {
            if view.lifecycle != lifecycle {
                return false;
            }
        }
        self.predicates.iter().all(|p| p.matches(view))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum QueryTarget {
    Object(Uuid),
    Search(SearchFilter),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub target: QueryTarget,
    #[serde(default)]
    pub context: QueryContext,
}

/// Zero or one view for object lookups, a sequence for searches.
#[derive(Debug)]
pub enum QueryResponse<S> {
    Single(Option<View>),
    Many(S),
}
