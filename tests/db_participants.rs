//! Postgres adapters. Run with `DATABASE_URL` set and `--ignored`.

use std::sync::Arc;
use std::time::Duration;

use participant_cache::application::participants::ParticipantService;
use participant_cache::application::repos::ParticipantsWriteRepo;
use participant_cache::cache::{CacheConfig, KvStore, ParticipantCache, ParticipantSource};
use participant_cache::domain::{FieldValue, ParticipantId, ParticipantRecord};
use participant_cache::infra::db::PostgresRepositories;
use serde_json::json;
use sqlx::PgPool;

fn record(id: i64, first_name: &str) -> ParticipantRecord {
    ParticipantRecord::new(ParticipantId::new(id))
        .with_field("first_name", first_name)
        .with_field("interests", vec!["chess".to_string(), "go".to_string()])
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn range_query_is_inclusive_and_ordered(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    for (id, name) in [
        (150, "Grace"),
        (5, "Ada"),
        (99, "Edsger"),
        (100, "Barbara"),
        (i64::MAX, "Last"),
    ] {
        repos
            .upsert_participant(&record(id, name))
            .await
            .expect("upsert participant");
    }

    let rows = repos.fetch_range(0, 99).await.expect("range query");
    let ids: Vec<i64> = rows.iter().map(|r| r.id.get()).collect();
    assert_eq!(ids, vec![5, 99]);

    let top = repos
        .fetch_range(i64::MAX - 7, i64::MAX)
        .await
        .expect("top range query");
    assert_eq!(top.len(), 1);

    let interests = rows[0].get("interests").expect("interests field");
    assert_eq!(
        interests,
        &FieldValue::List(vec!["chess".to_string(), "go".to_string()])
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn upsert_replaces_fields_and_delete_reports_removal(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    repos
        .upsert_participant(&record(7, "Ada"))
        .await
        .expect("insert");
    let renamed =
        ParticipantRecord::new(ParticipantId::new(7)).with_field("first_name", "Augusta");
    repos.upsert_participant(&renamed).await.expect("update");

    let rows = repos.fetch_range(0, 99).await.expect("range query");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("first_name").and_then(FieldValue::as_str),
        Some("Augusta")
    );
    assert!(rows[0].get("interests").is_none());

    assert!(
        repos
            .delete_participant(ParticipantId::new(7))
            .await
            .expect("delete")
    );
    assert!(
        !repos
            .delete_participant(ParticipantId::new(7))
            .await
            .expect("delete again")
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn kv_store_round_trips_and_hides_expired_rows(pool: PgPool) {
    let repos = PostgresRepositories::new(pool.clone());
    let store = repos.kv_store();

    store
        .set("pdb_participant_cache_0", json!({"group": 0}), Duration::from_secs(60))
        .await
        .expect("set");
    assert_eq!(
        store.get("pdb_participant_cache_0").await.expect("get"),
        Some(json!({"group": 0}))
    );
    assert!(
        store
            .expires_at("pdb_participant_cache_0")
            .await
            .expect("expires_at")
            .is_some()
    );

    sqlx::query(
        "INSERT INTO cache_entries (key, value, expires_at) VALUES ('old', '1', now() - interval '1 minute')",
    )
    .execute(&pool)
    .await
    .expect("seed expired row");
    assert_eq!(store.get("old").await.expect("get"), None);
    assert_eq!(store.purge_expired().await.expect("purge"), 1);

    store.delete("pdb_participant_cache_0").await.expect("delete");
    assert_eq!(store.get("pdb_participant_cache_0").await.expect("get"), None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn service_writes_are_visible_through_the_shared_cache(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let cache = Arc::new(ParticipantCache::new(
        CacheConfig::default(),
        Arc::new(repos.kv_store()),
        Arc::new(repos.clone()),
    ));
    let service = ParticipantService::new(Arc::new(repos.clone()), cache.clone());

    service.save(record(7, "Ada")).await.expect("save");
    let first = service.find(ParticipantId::new(7)).await.expect("record 7");
    assert_eq!(first.get("first_name").and_then(FieldValue::as_str), Some("Ada"));

    service.save(record(7, "Augusta")).await.expect("save");
    let second = service.find(ParticipantId::new(7)).await.expect("record 7");
    assert_eq!(
        second.get("first_name").and_then(FieldValue::as_str),
        Some("Augusta")
    );

    let written = service
        .import(vec![record(8, "Grace"), record(180, "Barbara")])
        .await
        .expect("import");
    assert_eq!(written, 2);
    assert!(service.find(ParticipantId::new(8)).await.is_some());
    assert!(service.find(ParticipantId::new(180)).await.is_some());

    assert!(service.delete(ParticipantId::new(8)).await.expect("delete"));
    assert!(service.find(ParticipantId::new(8)).await.is_none());
}
