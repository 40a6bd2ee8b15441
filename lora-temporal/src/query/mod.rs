//! Query layer: point-in-time, range, existence, and search over both axes.
//!
//! Every function takes its time coordinates explicitly; "now" is pinned by
//! the caller before the query runs.

pub mod point;
pub mod range;
pub mod search;

pub use point::{exists, get_at, get_current, registrations};
pub use range::get_range;
pub use search::{search_candidates, SearchResults};
