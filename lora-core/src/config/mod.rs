pub mod observability_config;
pub mod storage_config;
pub mod temporal_config;

use serde::{Deserialize, Serialize};

pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;
pub use temporal_config::TemporalConfig;

use crate::errors::{LoraError, LoraResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoraConfig {
    pub storage: StorageConfig,
    pub temporal: TemporalConfig,
    pub observability: ObservabilityConfig,
}

impl LoraConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> LoraResult<Self> {
        toml::from_str(toml_str).map_err(|e| LoraError::ConfigError(e.to_string()))
    }
}
