//! Idempotency guard: one effect per caller token.

pub mod guard;

pub use guard::{ensure_unclaimed, execute_once, get_by_token, lookup, store_claim, IdempotencyClaim};
