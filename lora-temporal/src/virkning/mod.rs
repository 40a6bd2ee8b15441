//! Virkning resolver: placement of time-sliced values within a registration
//! and their resolution at a point or over a range.

pub mod placement;
pub mod resolve;
pub mod validation;

pub use placement::{place_all, EntrySet};
pub use resolve::{overlapping, resolve_at};
pub use validation::{
    normalize_changes, normalize_entries, validate_changes, validate_disjoint, validate_entries,
};
