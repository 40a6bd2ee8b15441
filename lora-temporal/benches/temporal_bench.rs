//! Temporal benchmarks: placement, point resolution, and get_at on a store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use lora_core::config::TemporalConfig;
use lora_core::models::{
    Interval, MutationRequest, ObjectKind, Operation, QueryContext, TimeBound, VirkningChange,
    VirkningEntry,
};
use lora_core::traits::{IBitemporalStore, ManualClock};
use lora_storage::StorageEngine;
use lora_temporal::virkning::{place_all, resolve_at};
use lora_temporal::BitemporalEngine;

static FIELDS: [&str; 4] = ["user_key", "title", "scope", "example"];

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// A value per field per month over ~8 years.
fn changes() -> Vec<VirkningChange> {
    (0..100)
        .flat_map(|month| {
            FIELDS.iter().map(move |field| VirkningChange::Set {
                entry: VirkningEntry::attribute(
                    field,
                    json!(month),
                    Interval::new(day(month * 30), day(month * 30 + 30)).unwrap(),
                ),
            })
        })
        .collect()
}

fn bench_placement(c: &mut Criterion) {
    let changes = changes();
    c.bench_function("place_all_400_changes", |b| {
        b.iter(|| place_all(Vec::new(), black_box(&changes)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let entries = place_all(Vec::new(), &changes());
    c.bench_function("resolve_at_400_entries", |b| {
        b.iter(|| resolve_at(black_box(&entries), TimeBound::At(day(1500))))
    });
}

fn bench_get_at(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(day(0)));
    let engine = BitemporalEngine::new(storage, TemporalConfig::default()).with_clock(clock.clone());

    let uuid = rt.block_on(async {
        let created = engine
            .mutate(MutationRequest {
                object_type: ObjectKind::Class,
                actor: Some(uuid::Uuid::nil()),
                operation: Operation::Create {
                    uuid: None,
                    values: vec![],
                    note: None,
                },
                effective_time: None,
                idempotency_token: None,
            })
            .await
            .unwrap();
        for (i, chunk) in changes().chunks(40).enumerate() {
            clock.set(day(i as i64 + 1));
            engine
                .mutate(MutationRequest {
                    object_type: ObjectKind::Class,
                    actor: Some(uuid::Uuid::nil()),
                    operation: Operation::Update {
                        uuid: created.object_uuid,
                        changes: chunk.to_vec(),
                        note: None,
                    },
                    effective_time: None,
                    idempotency_token: None,
                })
                .await
                .unwrap();
        }
        created.object_uuid
    });

    let context = QueryContext::at(day(5), day(1500));
    c.bench_function("get_at_after_10_registrations", |b| {
        b.iter(|| rt.block_on(engine.get_at(black_box(uuid), &context)).unwrap())
    });
}

criterion_group!(benches, bench_placement, bench_resolve, bench_get_at);
criterion_main!(benches);
