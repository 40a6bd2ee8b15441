//! Object-kind schemas, views, and search predicates.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use lora_core::models::*;

fn view_with(entries: Vec<VirkningEntry>) -> View {
    let uuid = Uuid::new_v4();
    let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    View {
        object_uuid: uuid,
        object_type: ObjectKind::Class,
        lifecycle: Lifecycle::Created,
        registration: Registration {
            id: RegistrationId(1),
            object_uuid: uuid,
            object_type: ObjectKind::Class,
            period: Interval::starting(t0),
            actor: Uuid::new_v4(),
            lifecycle: Lifecycle::Created,
            operation: OperationKind::Create,
            note: None,
        },
        validity_time: TimeBound::At(t0),
        entries,
    }
}

#[test]
fn schema_accepts_known_fields() {
    let schema = ObjectKind::Class.schema();
    let entry = VirkningEntry::attribute("title", serde_json::json!("Finance"), Interval::always());
    assert!(schema.validate(ObjectKind::Class, &entry).is_ok());

    let state = VirkningEntry::state("published", "Published", Interval::always());
    assert!(schema.validate(ObjectKind::Class, &state).is_ok());
}

#[test]
fn schema_rejects_unknown_fields_and_states() {
    let schema = ObjectKind::Facet.schema();
    let entry = VirkningEntry::attribute("title", serde_json::json!("x"), Interval::always());
    assert!(schema.validate(ObjectKind::Facet, &entry).is_err());

    let state = VirkningEntry::state("published", "Maybe", Interval::always());
    assert!(schema.validate(ObjectKind::Facet, &state).is_err());

    let relation = VirkningEntry::relation("employee", Uuid::new_v4(), None, Interval::always());
    assert!(schema.validate(ObjectKind::Facet, &relation).is_err());
}

#[test]
fn object_kind_round_trips_through_str() {
    for kind in ObjectKind::ALL {
        assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), kind);
    }
    assert!("klasse".parse::<ObjectKind>().is_err());
}

#[test]
fn search_filter_predicates() {
    let facet = Uuid::new_v4();
    let view = view_with(vec![
        VirkningEntry::attribute("user_key", serde_json::json!("ENG"), Interval::always()),
        VirkningEntry::state("published", "Published", Interval::always()),
        VirkningEntry::relation("facet", facet, Some("primary"), Interval::always()),
    ]);

    let filter = SearchFilter::of_type(ObjectKind::Class)
        .with(Predicate::AttributeEquals {
            field: "user_key".into(),
            value: serde_json::json!("ENG"),
        })
        .with(Predicate::RelatesTo {
            field: "facet".into(),
            target: facet,
        });
    assert!(filter.matches(&view));

    let wrong_state = SearchFilter::default().with(Predicate::StateEquals {
        field: "published".into(),
        value: "Unpublished".into(),
    });
    assert!(!wrong_state.matches(&view));

    let passive_only = SearchFilter {
        lifecycle: Some(Lifecycle::Passive),
        ..SearchFilter::default()
    };
    assert!(!passive_only.matches(&view));
}

#[test]
fn mutation_request_deserializes_from_json() {
    let json = r#"{
        "object_type": "facet",
        "actor": "42c432e8-9c4a-11e6-9f62-873cf34a735f",
        "operation": {
            "kind": "update",
            "uuid": "b1a5c5e0-0000-4000-8000-000000000001",
            "changes": [
                {"op": "terminate", "kind": "state", "field": "published", "at": "2021-06-01T00:00:00Z"}
            ]
        }
    }"#;
    let request: MutationRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.operation.kind(), OperationKind::Update);
    assert!(request.idempotency_token.is_none());
    match &request.operation {
        Operation::Update { changes, .. } => assert_eq!(changes.len(), 1),
        other => panic!("unexpected operation {other:?}"),
    }
}

#[test]
fn fingerprint_is_stable_and_payload_sensitive() {
    let a = Operation::Delete { uuid: Uuid::nil(), note: None };
    let b = Operation::Delete { uuid: Uuid::nil(), note: Some("typo".into()) };
    assert_eq!(fingerprint(&a).unwrap(), fingerprint(&a).unwrap());
    assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
}
