//! The closed set of entity kinds and the field schema each contributes.
//!
//! Kinds never get their own path through the temporal engine; the only thing
//! a kind decides is which attribute, state, and relation fields are legal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::virkning::{VirkningEntry, VirkningValue};
use crate::errors::{LoraError, LoraResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Organisation,
    OrganisationUnit,
    OrganisationFunction,
    Facet,
    Class,
    ItSystem,
    User,
}

/// A state field and its allowed values.
#[derive(Debug, Clone, Copy)]
pub struct StateField {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

/// Fields an object kind accepts.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema {
    pub attributes: &'static [&'static str],
    pub states: &'static [StateField],
    pub relations: &'static [&'static str],
}

const VALIDITY: StateField = StateField {
    name: "validity",
    values: &["Active", "Inactive"],
};

const PUBLISHED: StateField = StateField {
    name: "published",
    values: &["Published", "Unpublished"],
};

const ORGANISATION: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "name"],
    states: &[VALIDITY],
    relations: &["top_unit", "owner"],
};

const ORGANISATION_UNIT: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "name"],
    states: &[VALIDITY],
    relations: &["parent", "unit_type", "unit_level", "organisation"],
};

const ORGANISATION_FUNCTION: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "function_name", "fraction"],
    states: &[VALIDITY],
    relations: &[
        "employee",
        "unit",
        "job_function",
        "engagement_type",
        "organisation",
    ],
};

const FACET: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "description"],
    states: &[PUBLISHED],
    relations: &["owner", "responsible", "facet_parent"],
};

const CLASS: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "title", "scope", "example"],
    states: &[PUBLISHED],
    relations: &["facet", "parent", "owner", "responsible"],
};

const IT_SYSTEM: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "name", "system_type", "configuration_ref"],
    states: &[VALIDITY],
    relations: &["owning_organisation", "used_by"],
};

const USER: ObjectSchema = ObjectSchema {
    attributes: &["user_key", "given_name", "surname"],
    states: &[VALIDITY],
    relations: &["organisation"],
};

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Organisation,
        ObjectKind::OrganisationUnit,
        ObjectKind::OrganisationFunction,
        ObjectKind::Facet,
        ObjectKind::Class,
        ObjectKind::ItSystem,
        ObjectKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Organisation => "organisation",
            ObjectKind::OrganisationUnit => "organisation_unit",
            ObjectKind::OrganisationFunction => "organisation_function",
            ObjectKind::Facet => "facet",
            ObjectKind::Class => "class",
            ObjectKind::ItSystem => "it_system",
            ObjectKind::User => "user",
        }
    }

    pub fn schema(&self) -> &'static ObjectSchema {
        match self {
            ObjectKind::Organisation => &ORGANISATION,
            ObjectKind::OrganisationUnit => &ORGANISATION_UNIT,
            ObjectKind::OrganisationFunction => &ORGANISATION_FUNCTION,
            ObjectKind::Facet => &FACET,
            ObjectKind::Class => &CLASS,
            ObjectKind::ItSystem => &IT_SYSTEM,
            ObjectKind::User => &USER,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = LoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| LoraError::ValidationError(format!("unknown object kind: {s}")))
    }
}

impl ObjectSchema {
    /// Check that an entry names a field this kind knows, with a legal value.
    pub fn validate(&self, kind: ObjectKind, entry: &VirkningEntry) -> LoraResult<()> {
        let field = entry.field.as_str();
        match &entry.value {
            VirkningValue::Attribute(_) => {
                if !self.attributes.contains(&field) {
                    return Err(LoraError::ValidationError(format!(
                        "{kind} has no attribute '{field}'"
                    )));
                }
            }
            VirkningValue::State(value) => {
                let state = self
                    .states
                    .iter()
                    .find(|s| s.name == field)
                    .ok_or_else(|| {
                        LoraError::ValidationError(format!("{kind} has no state '{field}'"))
                    })?;
                if !state.values.contains(&value.as_str()) {
                    return Err(LoraError::ValidationError(format!(
                        "state '{field}' of {kind} does not allow '{value}' (allowed: {})",
                        state.values.join(", ")
                    )));
                }
            }
            VirkningValue::Relation { .. } => {
                if !self.relations.contains(&field) {
                    return Err(LoraError::ValidationError(format!(
                        "{kind} has no relation '{field}'"
                    )));
                }
            }
        }
        Ok(())
    }
}
