//! Point and range resolution.

use std::collections::BTreeMap;

use lora_core::models::{Interval, TimeBound, VirkningEntry, VirkningKind};

/// The effective value of every field at `at`: one entry per (kind, field),
/// ordered by kind then field.
///
/// Stored entry sets never overlap within a field, but if they do the entry
/// with the highest sequence number (the later insertion) wins.
pub fn resolve_at(entries: &[VirkningEntry], at: TimeBound) -> Vec<VirkningEntry> {
    let mut winners: BTreeMap<(VirkningKind, &str), &VirkningEntry> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.validity.contains_bound(at)) {
        winners
            .entry(entry.key())
            .and_modify(|current| {
                if entry.seq >= current.seq {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }
    winners.into_values().cloned().collect()
}

/// All entries overlapping `range`, ordered by (kind, field, validity start).
pub fn overlapping(entries: &[VirkningEntry], range: &Interval) -> Vec<VirkningEntry> {
    let mut hits: Vec<VirkningEntry> = entries
        .iter()
        .filter(|e| e.validity.overlaps(range))
        .cloned()
        .collect();
    hits.sort_by(|a, b| {
        a.key()
            .cmp(&b.key())
            .then(a.validity.from().cmp(&b.validity.from()))
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn at(year: i32) -> TimeBound {
        TimeBound::At(Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn later_insertion_wins_a_tie() {
        let mut older = VirkningEntry::attribute("title", json!("old"), Interval::always());
        older.seq = 1;
        let mut newer = VirkningEntry::attribute("title", json!("new"), Interval::always());
        newer.seq = 2;

        for entries in [vec![older.clone(), newer.clone()], vec![newer.clone(), older.clone()]] {
            let resolved = resolve_at(&entries, at(2020));
            assert_eq!(resolved.len(), 1);
            assert_eq!(resolved[0].value, newer.value);
        }
    }

    #[test]
    fn nothing_resolves_outside_validity() {
        let entry = VirkningEntry::state(
            "validity",
            "Active",
            Interval::new(at(2000), at(2001)).unwrap(),
        );
        assert!(resolve_at(&[entry.clone()], at(2001)).is_empty());
        assert_eq!(resolve_at(&[entry], at(2000)).len(), 1);
    }

    #[test]
    fn range_returns_every_overlapping_slice() {
        let entries = vec![
            VirkningEntry::attribute("title", json!(2), Interval::new(at(2005), at(2010)).unwrap()),
            VirkningEntry::attribute("title", json!(1), Interval::new(at(2000), at(2005)).unwrap()),
            VirkningEntry::attribute("title", json!(3), Interval::new(at(2010), at(2020)).unwrap()),
        ];
        let hits = overlapping(&entries, &Interval::new(at(2003), at(2010)).unwrap());
        let values: Vec<_> = hits.iter().map(|e| e.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                lora_core::models::VirkningValue::Attribute(json!(1)),
                lora_core::models::VirkningValue::Attribute(json!(2)),
            ]
        );
    }
}
