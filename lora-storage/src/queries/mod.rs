//! Raw SQL per table. Every function takes a `&Connection` and leaves
//! transaction control to the caller.

pub mod audit_ops;
pub mod idempotency_ops;
pub mod registration_ops;
pub mod virkning_ops;
