//! Copy-on-write placement of virkning entries.
//!
//! Placing an entry supersedes whatever its field held over the entry's
//! validity: overlapped entries are truncated or split, and the uncovered
//! remainder is kept. The placed entry takes the next sequence number, so
//! within one registration the latest placement always wins.

use chrono::{DateTime, Utc};

use lora_core::models::{TimeBound, VirkningChange, VirkningEntry, VirkningKind};

/// The entry set of a registration under construction.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    entries: Vec<VirkningEntry>,
    next_seq: u32,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the entries carried forward from the previous registration.
    pub fn from_entries(entries: Vec<VirkningEntry>) -> Self {
        let next_seq = entries
            .iter()
            .map(|e| e.seq.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { entries, next_seq }
    }

    pub fn entries(&self) -> &[VirkningEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `entry`, splitting or truncating overlapped entries of the same field.
    pub fn place(&mut self, mut entry: VirkningEntry) {
        let mut kept = Vec::with_capacity(self.entries.len() + 2);
        for existing in self.entries.drain(..) {
            if !(existing.same_field(&entry) && existing.validity.overlaps(&entry.validity)) {
                kept.push(existing);
                continue;
            }
            for piece in existing.validity.subtract(&entry.validity) {
                kept.push(VirkningEntry {
                    validity: piece,
                    ..existing.clone()
                });
            }
        }
        entry.seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        kept.push(entry);
        self.entries = kept;
    }

    /// End every entry of one field at `at`. Entries starting at or after
    /// `at` disappear.
    pub fn terminate(&mut self, kind: VirkningKind, field: &str, at: TimeBound) {
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|e| {
                if e.key() != (kind, field) {
                    return Some(e);
                }
                let validity = e.validity.truncate_at(at)?;
                Some(VirkningEntry { validity, ..e })
            })
            .collect();
    }

    /// End every entry no later than `at`.
    pub fn clip_to(&mut self, at: DateTime<Utc>) {
        let end = TimeBound::At(at);
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|e| {
                let validity = e.validity.truncate_at(end)?;
                Some(VirkningEntry { validity, ..e })
            })
            .collect();
    }

    pub fn apply(&mut self, change: &VirkningChange) {
        match change {
            VirkningChange::Set { entry } => self.place(entry.clone()),
            VirkningChange::Terminate { kind, field, at } => self.terminate(*kind, field, *at),
        }
    }

    /// The finished set, in insertion order.
    pub fn into_entries(mut self) -> Vec<VirkningEntry> {
        self.entries
            .sort_by(|a, b| a.seq.cmp(&b.seq).then(a.validity.from().cmp(&b.validity.from())));
        self.entries
    }
}

/// Apply `changes` in order on top of `base`. Later changes win.
pub fn place_all(base: Vec<VirkningEntry>, changes: &[VirkningChange]) -> Vec<VirkningEntry> {
    let mut set = EntrySet::from_entries(base);
    for change in changes {
        set.apply(change);
    }
    set.into_entries()
}
