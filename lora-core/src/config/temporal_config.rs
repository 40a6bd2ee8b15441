//! Temporal engine configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Configuration for the registration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Actor used when the presentation layer supplies none (legacy
    /// integrations). `None` means every mutation must carry an actor.
    pub system_actor: Option<Uuid>,
    /// Upper bound on virkning entries in one create/update payload.
    pub max_changes_per_mutation: usize,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            system_actor: None,
            max_changes_per_mutation: 1_000,
        }
    }
}
