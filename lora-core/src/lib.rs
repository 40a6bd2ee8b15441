//! # lora-core
//!
//! Foundation crate for the LoRa bitemporal object store.
//! Domain models, the error taxonomy, configuration, and the traits through
//! which the temporal engine meets its collaborators (clock, actor resolution,
//! the store itself).

pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod traits;

pub use config::LoraConfig;
pub use errors::{LoraError, LoraResult};
