//! Lazy search.
//!
//! Candidates are the registrations covering the pinned registration time,
//! listed once up front. Entries are loaded and resolved one candidate at a
//! time as the caller pulls. A registration's entries never change once
//! written, so a partly consumed search stays consistent with its snapshot
//! while writers continue. Run the search again to restart it.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use lora_core::errors::LoraResult;
use lora_core::models::{Lifecycle, Registration, SearchFilter, View};
use lora_storage::queries::registration_ops;
use lora_storage::StorageEngine;

use super::point::resolve_view;

/// Registrations at `registration_time` that can match `filter` before
/// their entries are looked at.
pub fn search_candidates(
    conn: &Connection,
    filter: &SearchFilter,
    registration_time: DateTime<Utc>,
) -> LoraResult<Vec<Registration>> {
    if filter.lifecycle == Some(Lifecycle::Deleted) {
        return Ok(Vec::new());
    }
    let mut candidates = registration_ops::list_registrations_at(conn, filter.object_type, registration_time)?;
    if let Some(lifecycle) = filter.lifecycle {
        candidates.retain(|r| r.lifecycle == lifecycle);
    }
    Ok(candidates)
}

/// Finite iterator of matching views.
///
/// `next` reads synchronously. On an in-memory store it waits for the
/// writer, so inside async code iterate it on a multi-thread runtime or from
/// `spawn_blocking`.
pub struct SearchResults {
    storage: Arc<StorageEngine>,
    candidates: VecDeque<Registration>,
    validity_time: DateTime<Utc>,
    filter: SearchFilter,
}

impl SearchResults {
    pub fn new(
        storage: Arc<StorageEngine>,
        candidates: Vec<Registration>,
        validity_time: DateTime<Utc>,
        filter: SearchFilter,
    ) -> Self {
        Self {
            storage,
            candidates: candidates.into(),
            validity_time,
            filter,
        }
    }

    /// Candidates not yet examined.
    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }
}

impl Iterator for SearchResults {
    type Item = LoraResult<View>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(registration) = self.candidates.pop_front() {
            let validity_time = self.validity_time;
            let view = self
                .storage
                .read_sync(|conn| resolve_view(conn, registration, validity_time));
            match view {
                Ok(view) if self.filter.matches(&view) => return Some(Ok(view)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.candidates.len()))
    }
}
