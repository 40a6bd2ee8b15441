//! # lora-temporal
//!
//! The temporal engine of the LoRa store. Registrations along transaction
//! time, virkning along validity time, an append-only audit log, idempotent
//! mutation, and point/range/search queries over both axes.

pub mod audit;
pub mod engine;
pub mod idempotency;
pub mod query;
pub mod registration;
pub mod virkning;

pub use engine::{BitemporalEngine, PreparedMutation};
pub use query::SearchResults;
