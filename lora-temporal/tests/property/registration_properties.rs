//! Property tests for lora-temporal: registration partition and placement.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

use lora_core::config::TemporalConfig;
use lora_core::models::{
    Interval, MutationRequest, ObjectKind, Operation, TimeBound, VirkningChange, VirkningEntry,
};
use lora_core::traits::{IBitemporalStore, ManualClock};
use lora_storage::StorageEngine;
use lora_temporal::virkning::{place_all, resolve_at, validate_disjoint};
use lora_temporal::BitemporalEngine;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

fn request(operation: Operation, effective_time: DateTime<Utc>) -> MutationRequest {
    MutationRequest {
        object_type: ObjectKind::Class,
        actor: Some(uuid::Uuid::nil()),
        operation,
        effective_time: Some(effective_time),
        idempotency_token: None,
    }
}

/// Day offsets relative to the previous step; zero and negative ones must be
/// rejected without disturbing the history.
fn steps() -> impl Strategy<Value = Vec<(i64, bool)>> {
    prop::collection::vec((-3i64..10, any::<bool>()), 1..12)
}

fn span() -> impl Strategy<Value = (i64, i64)> {
    (0i64..100, 1i64..50).prop_map(|(from, len)| (from, from + len))
}

fn day(n: i64) -> DateTime<Utc> {
    base() + Duration::days(n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn registrations_partition_time_from_creation(steps in steps()) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
            let clock = Arc::new(ManualClock::new(base()));
            let engine = BitemporalEngine::new(storage, TemporalConfig::default()).with_clock(clock);

            let created = engine
                .mutate(request(Operation::Create { uuid: None, values: vec![], note: None }, base()))
                .await
                .unwrap();
            let uuid = created.object_uuid;

            let mut at = base();
            for (i, (offset, passivate)) in steps.iter().enumerate() {
                let candidate = at + Duration::days(*offset);
                let operation = if *passivate {
                    Operation::Passivate { uuid, note: None }
                } else {
                    Operation::Update {
                        uuid,
                        changes: vec![VirkningChange::Set {
                            entry: VirkningEntry::attribute("title", json!(i), Interval::always()),
                        }],
                        note: None,
                    }
                };
                let result = engine.mutate(request(operation, candidate)).await;
                if *offset > 0 {
                    prop_assert!(result.is_ok());
                    at = candidate;
                } else {
                    prop_assert!(result.is_err());
                }
            }

            let registrations = engine.registrations(uuid).await.unwrap();
            prop_assert_eq!(registrations[0].period.from(), TimeBound::At(base()));
            for pair in registrations.windows(2) {
                prop_assert_eq!(pair[0].period.to(), pair[1].period.from());
            }
            let open: Vec<_> = registrations.iter().filter(|r| r.is_current()).collect();
            prop_assert_eq!(open.len(), 1);
            prop_assert_eq!(open[0].id, registrations[registrations.len() - 1].id);

            let accepted = steps.iter().filter(|(offset, _)| *offset > 0).count();
            prop_assert_eq!(registrations.len(), accepted + 1);
            prop_assert_eq!(engine.history(uuid).await.unwrap().len(), accepted + 1);
            Ok(())
        })?;
    }

    #[test]
    fn placement_keeps_fields_disjoint_and_last_write_wins(spans in prop::collection::vec(span(), 1..10)) {
        let changes: Vec<_> = spans
            .iter()
            .enumerate()
            .map(|(i, (from, to))| VirkningChange::Set {
                entry: VirkningEntry::attribute(
                    "title",
                    json!(i),
                    Interval::new(day(*from), day(*to)).unwrap(),
                ),
            })
            .collect();
        let placed = place_all(Vec::new(), &changes);
        prop_assert!(validate_disjoint(&placed).is_ok());

        for probe in 0..150 {
            let expected = spans
                .iter()
                .enumerate()
                .rev()
                .find(|(_, (from, to))| *from <= probe && probe < *to)
                .map(|(i, _)| json!(i));
            let resolved = resolve_at(&placed, TimeBound::At(day(probe)));
            let actual = resolved.first().and_then(|e| match &e.value {
                lora_core::models::VirkningValue::Attribute(v) => Some(v.clone()),
                _ => None,
            });
            prop_assert_eq!(actual, expected);
        }
    }
}
