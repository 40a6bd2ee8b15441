//! Query layer: search, ranges, and the read pool path.

mod common;

use serde_json::json;
use uuid::Uuid;

use lora_core::models::{
    Interval, Lifecycle, ObjectKind, Predicate, QueryContext, QueryRequest, QueryResponse,
    QueryTarget, SearchFilter, VirkningEntry, VirkningKind,
};
use lora_core::traits::IBitemporalStore;
use lora_temporal::BitemporalEngine;

use common::*;

async fn seed(engine: &BitemporalEngine, clock: &lora_core::traits::ManualClock) -> [Uuid; 4] {
    let mut ids = [Uuid::nil(); 4];
    for (i, title) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
        ids[i] = engine
            .mutate(create_class(vec![
                VirkningEntry::attribute("title", json!(title), Interval::always()),
                VirkningEntry::state("published", "Published", Interval::starting(t(2020, 1, 1))),
            ]))
            .await
            .unwrap()
            .object_uuid;
    }
    engine
        .mutate(create(
            ObjectKind::Facet,
            vec![VirkningEntry::attribute("user_key", json!("f"), Interval::always())],
        ))
        .await
        .unwrap();

    clock.set(t(2021, 2, 1));
    engine.mutate(passivate_class(ids[2])).await.unwrap();
    engine.mutate(delete_class(ids[3])).await.unwrap();
    clock.set(t(2021, 3, 1));
    ids
}

#[tokio::test]
async fn search_filters_by_type_and_skips_deleted() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    let ids = seed(&engine, &clock).await;

    let results: Vec<_> = engine
        .search(&SearchFilter::of_type(ObjectKind::Class), &QueryContext::now())
        .await
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let mut found: Vec<Uuid> = results.iter().map(|v| v.object_uuid).collect();
    found.sort();
    let mut expected = vec![ids[0], ids[1], ids[2]];
    expected.sort();
    assert_eq!(found, expected);

    let everything = engine
        .search(&SearchFilter::default(), &QueryContext::now())
        .await
        .unwrap()
        .count();
    assert_eq!(everything, 4);
}

#[tokio::test]
async fn search_applies_predicates_and_lifecycle() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    let ids = seed(&engine, &clock).await;

    let filter = SearchFilter::of_type(ObjectKind::Class)
        .with(Predicate::AttributeEquals {
            field: "title".to_string(),
            value: json!("beta"),
        });
    let hits: Vec<_> = engine
        .search(&filter, &QueryContext::now())
        .await
        .unwrap()
        .map(|r| r.unwrap().object_uuid)
        .collect();
    assert_eq!(hits, vec![ids[1]]);

    let passive = SearchFilter {
        lifecycle: Some(Lifecycle::Passive),
        ..SearchFilter::default()
    };
    let hits: Vec<_> = engine
        .search(&passive, &QueryContext::now())
        .await
        .unwrap()
        .map(|r| r.unwrap().object_uuid)
        .collect();
    assert_eq!(hits, vec![ids[2]]);

    let deleted = SearchFilter {
        lifecycle: Some(Lifecycle::Deleted),
        ..SearchFilter::default()
    };
    assert_eq!(engine.search(&deleted, &QueryContext::now()).await.unwrap().count(), 0);

    // The passive object's published state ended with the passivation.
    let published = SearchFilter::of_type(ObjectKind::Class).with(Predicate::StateEquals {
        field: "published".to_string(),
        value: "Published".to_string(),
    });
    assert_eq!(engine.search(&published, &QueryContext::now()).await.unwrap().count(), 2);
    let has_title = SearchFilter::default().with(Predicate::HasField {
        kind: VirkningKind::Attribute,
        field: "title".to_string(),
    });
    assert_eq!(engine.search(&has_title, &QueryContext::now()).await.unwrap().count(), 2);
}

#[tokio::test]
async fn search_at_an_earlier_registration_time() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    let ids = seed(&engine, &clock).await;

    let before_deletion = QueryContext::at(t(2021, 1, 15), t(2021, 1, 15));
    let found = engine
        .search(&SearchFilter::of_type(ObjectKind::Class), &before_deletion)
        .await
        .unwrap()
        .map(|r| r.unwrap())
        .collect::<Vec<_>>();
    assert_eq!(found.len(), 4);
    assert!(found.iter().any(|v| v.object_uuid == ids[3]));
    assert!(found.iter().all(|v| v.lifecycle == Lifecycle::Created));

    let before_anything = QueryContext::at(t(2020, 1, 1), t(2020, 1, 1));
    assert_eq!(
        engine.search(&SearchFilter::default(), &before_anything).await.unwrap().count(),
        0
    );
}

#[tokio::test]
async fn search_is_lazy_and_restartable() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    seed(&engine, &clock).await;
    let filter = SearchFilter::of_type(ObjectKind::Class);

    let mut results = engine.search(&filter, &QueryContext::now()).await.unwrap();
    assert_eq!(results.remaining(), 3);
    assert!(results.next().is_some());
    assert_eq!(results.remaining(), 2);

    // Writes after the search started do not leak into it.
    engine.mutate(create_class(vec![])).await.unwrap();
    assert_eq!(results.count(), 2);

    let rerun = engine.search(&filter, &QueryContext::now()).await.unwrap();
    assert_eq!(rerun.count(), 4);
}

#[tokio::test]
async fn query_entry_point_dispatches() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    let ids = seed(&engine, &clock).await;

    let single = engine
        .query(QueryRequest {
            target: QueryTarget::Object(ids[0]),
            context: QueryContext::now(),
        })
        .await
        .unwrap();
    match single {
        QueryResponse::Single(Some(view)) => assert_eq!(view.attribute("title"), Some(&json!("alpha"))),
        _ => panic!("expected a single view"),
    }

    let gone = engine
        .query(QueryRequest {
            target: QueryTarget::Object(ids[3]),
            context: QueryContext::now(),
        })
        .await
        .unwrap();
    assert!(matches!(gone, QueryResponse::Single(None)));

    let many = engine
        .query(QueryRequest {
            target: QueryTarget::Search(SearchFilter::of_type(ObjectKind::Facet)),
            context: QueryContext::now(),
        })
        .await
        .unwrap();
    match many {
        QueryResponse::Many(results) => assert_eq!(results.count(), 1),
        _ => panic!("expected a search"),
    }
}

#[tokio::test]
async fn range_view_lists_every_slice() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    let uuid = engine
        .mutate(create_class(vec![
            VirkningEntry::attribute("title", json!(1), Interval::new(t(2019, 1, 1), t(2020, 1, 1)).unwrap()),
            VirkningEntry::attribute("title", json!(2), Interval::new(t(2020, 1, 1), t(2021, 1, 1)).unwrap()),
            VirkningEntry::attribute("title", json!(3), Interval::starting(t(2021, 1, 1))),
            VirkningEntry::state("validity", "Active", Interval::always()),
        ]))
        .await
        .unwrap()
        .object_uuid;
    clock.set(t(2021, 2, 1));

    let range = Interval::new(t(2019, 6, 1), t(2020, 6, 1)).unwrap();
    let view = engine.get_range(uuid, None, range).await.unwrap().unwrap();
    assert_eq!(view.range, range);
    let titles: Vec<_> = view
        .entries
        .iter()
        .filter(|e| e.field == "title")
        .map(|e| e.value.clone())
        .collect();
    assert_eq!(titles.len(), 2);
    assert_eq!(view.entries.len(), 3);

    assert!(engine.get_range(uuid, Some(t(2020, 1, 1)), range).await.unwrap().is_none());
    assert!(engine.get_range(Uuid::new_v4(), None, range).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_objects() {
    let (engine, _clock) = engine_at(t(2021, 1, 1));
    let missing = Uuid::new_v4();
    assert!(engine.get_current(missing).await.unwrap().is_none());
    assert!(engine.get_at(missing, &QueryContext::now()).await.unwrap().is_none());
    assert!(!engine.exists(missing, None).await.unwrap());
    assert!(engine.registrations(missing).await.is_err());
    assert!(engine.history(missing).await.unwrap().is_empty());
}

#[tokio::test]
async fn file_backed_store_reads_through_the_pool() {
    let (engine, clock, _dir) = file_engine_at(t(2021, 1, 1));
    assert!(!engine.storage().is_in_memory());

    let uuid = engine
        .mutate(create_class(vec![VirkningEntry::attribute("title", json!("x"), Interval::always())]))
        .await
        .unwrap()
        .object_uuid;
    clock.set(t(2021, 2, 1));
    engine
        .mutate(update_class(
            uuid,
            vec![set(VirkningEntry::attribute("title", json!("y"), Interval::always()))],
        ))
        .await
        .unwrap();

    let current = engine.get_current(uuid).await.unwrap().unwrap();
    assert_eq!(current.attribute("title"), Some(&json!("y")));
    let found = engine
        .search(&SearchFilter::of_type(ObjectKind::Class), &QueryContext::now())
        .await
        .unwrap()
        .count();
    assert_eq!(found, 1);
    assert_eq!(engine.history(uuid).await.unwrap().len(), 2);
    assert!(engine.is_reachable().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn search_iterates_while_the_writer_is_busy() {
    let (engine, clock) = engine_at(t(2021, 1, 1));
    seed(&engine, &clock).await;

    let results = engine
        .search(&SearchFilter::of_type(ObjectKind::Class), &QueryContext::now())
        .await
        .unwrap();

    let storage = std::sync::Arc::clone(engine.storage());
    let (held_tx, held_rx) = tokio::sync::oneshot::channel();
    let hold = tokio::spawn(async move {
        storage
            .with_writer(move |_| {
                let _ = held_tx.send(());
                std::thread::sleep(std::time::Duration::from_millis(30));
                Ok(())
            })
            .await
    });
    held_rx.await.unwrap();

    let found = results.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(found.len(), 3);
    hold.await.unwrap().unwrap();
}
