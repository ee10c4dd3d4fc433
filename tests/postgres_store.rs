//! Postgres document store behavior.
//!
//! Marked `#[ignore]`; run with `DATABASE_URL` pointing at a scratch server:
//! `cargo test --test postgres_store -- --ignored`.

use std::collections::HashSet;

use serde_json::json;
use snapshare::application::repos::{Document, DocumentStore, Filter, RepoError};
use snapshare::domain::types::{Collection, Counter, Field};
use snapshare::infra::db::PostgresRepositories;
use sqlx::PgPool;
use uuid::Uuid;

fn document(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn id_of(document: &Document) -> Uuid {
    document["_id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .expect("assigned id")
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn reference_indexes_exist(pool: PgPool) {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT indexname FROM pg_indexes WHERE schemaname = 'public' AND tablename = 'documents'",
    )
    .fetch_all(&pool)
    .await
    .expect("fetch document indexes");
    let indexes: HashSet<String> = rows.into_iter().collect();

    for index in [
        "documents_user_email_key",
        "documents_user_ref_idx",
        "documents_post_ref_idx",
        "documents_follower_ref_idx",
    ] {
        assert!(indexes.contains(index), "missing {index}");
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn insert_query_and_increment(pool: PgPool) {
    let store = PostgresRepositories::new(pool);
    store.health_check().await.expect("healthy");

    let user = store
        .insert(
            Collection::User,
            document(json!({ "userName": "ann", "email": "ann@example.com", "postCount": 0 })),
        )
        .await
        .expect("insert user");
    let user_id = id_of(&user);

    let found = store
        .get_one_by_query(Collection::User, &Filter::eq(Field::Email, "ann@example.com"))
        .await
        .expect("query")
        .expect("user found");
    assert_eq!(id_of(&found), user_id);

    let prefixed = store
        .get_many_by_query(Collection::User, &Filter::starts_with(Field::UserName, "AN"))
        .await
        .expect("prefix query");
    assert_eq!(prefixed.len(), 1);

    assert!(
        store
            .increment_field(user_id, Counter::PostCount, 2)
            .await
            .expect("increment")
    );
    assert!(
        !store
            .increment_field(Uuid::new_v4(), Counter::PostCount, 1)
            .await
            .expect("increment missing")
    );
    let reloaded = store
        .get_by_id(Collection::User, user_id)
        .await
        .expect("read")
        .expect("user");
    assert_eq!(reloaded["postCount"], 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn duplicate_email_is_reported(pool: PgPool) {
    let store = PostgresRepositories::new(pool);
    let user = || document(json!({ "userName": "ann", "email": "ann@example.com" }));

    store.insert(Collection::User, user()).await.expect("first");
    let err = store
        .insert(Collection::User, user())
        .await
        .expect_err("second insert violates the unique email");
    assert!(matches!(err, RepoError::Duplicate { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn delete_many_scopes_to_collection(pool: PgPool) {
    let store = PostgresRepositories::new(pool);
    let owner = Uuid::new_v4();
    for collection in [Collection::Post, Collection::Like] {
        store
            .insert(collection, document(json!({ "userID": owner })))
            .await
            .expect("insert");
    }

    let deleted = store
        .delete_many_by_query(Collection::Post, &Filter::eq(Field::UserId, owner))
        .await
        .expect("delete");
    assert_eq!(deleted.deleted_count, 1);

    let likes = store
        .get_many_by_query(Collection::Like, &Filter::eq(Field::UserId, owner))
        .await
        .expect("likes");
    assert_eq!(likes.len(), 1);
}
