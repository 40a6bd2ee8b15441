//! Shared fixtures for the temporal integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use lora_core::config::TemporalConfig;
use lora_core::models::{MutationRequest, ObjectKind, Operation, VirkningChange, VirkningEntry};
use lora_core::traits::ManualClock;
use lora_storage::StorageEngine;
use lora_temporal::BitemporalEngine;

pub const ACTOR: Uuid = Uuid::from_u128(0xA11CE);
pub const OTHER_ACTOR: Uuid = Uuid::from_u128(0xB0B);

pub fn t(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// In-memory engine whose clock starts at `start`.
pub fn engine_at(start: DateTime<Utc>) -> (BitemporalEngine, Arc<ManualClock>) {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(start));
    let engine = BitemporalEngine::new(storage, TemporalConfig::default()).with_clock(clock.clone());
    (engine, clock)
}

/// File-backed engine, so reads go through the read pool.
pub fn file_engine_at(start: DateTime<Utc>) -> (BitemporalEngine, Arc<ManualClock>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(StorageEngine::open(&dir.path().join("lora.db")).unwrap());
    let clock = Arc::new(ManualClock::new(start));
    let engine = BitemporalEngine::new(storage, TemporalConfig::default()).with_clock(clock.clone());
    (engine, clock, dir)
}

fn request(object_type: ObjectKind, operation: Operation) -> MutationRequest {
    MutationRequest {
        object_type,
        actor: Some(ACTOR),
        operation,
        effective_time: None,
        idempotency_token: None,
    }
}

pub fn create(object_type: ObjectKind, values: Vec<VirkningEntry>) -> MutationRequest {
    request(
        object_type,
        Operation::Create {
            uuid: None,
            values,
            note: None,
        },
    )
}

pub fn create_class(values: Vec<VirkningEntry>) -> MutationRequest {
    create(ObjectKind::Class, values)
}

pub fn update_class(uuid: Uuid, changes: Vec<VirkningChange>) -> MutationRequest {
    request(
        ObjectKind::Class,
        Operation::Update {
            uuid,
            changes,
            note: None,
        },
    )
}

pub fn set(entry: VirkningEntry) -> VirkningChange {
    VirkningChange::Set { entry }
}

pub fn passivate_class(uuid: Uuid) -> MutationRequest {
    request(ObjectKind::Class, Operation::Passivate { uuid, note: None })
}

pub fn delete_class(uuid: Uuid) -> MutationRequest {
    request(ObjectKind::Class, Operation::Delete { uuid, note: None })
}
