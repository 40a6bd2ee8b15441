//! Audit log: who changed what, and when.

pub mod ledger;

pub use ledger::{by_actor, history, in_range, record, record_legacy};
