//! FirebaseStore against the fake REST database over real HTTP.

use std::time::Duration;

use axum::http::Method;
use integration_tests::FakeDatabase;
use rb_core::error::SyncError;
use rb_core::traits::DocumentStore;
use rb_store_firebase::FirebaseStore;
use reqwest::Url;
use secrecy::SecretString;
use serde_json::{json, Value};

fn adapter(db: &FakeDatabase) -> FirebaseStore {
    FirebaseStore::new(Url::parse(&db.base_url()).unwrap(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn reads_collection_and_missing_nodes() {
    let db = FakeDatabase::spawn(json!({ "boards": { "K1": { "title": "a" } } }))
        .await
        .unwrap();
    let store = adapter(&db);

    assert_eq!(store.get("boards").await.unwrap(), json!({ "K1": { "title": "a" } }));
    assert_eq!(store.get("boards/K9").await.unwrap(), Value::Null);
    assert_eq!(db.seen().await[0].path, "boards.json");
}

#[tokio::test]
async fn post_returns_generated_name_and_sends_json() {
    let db = FakeDatabase::spawn(Value::Null).await.unwrap();
    let store = adapter(&db);

    let key = store.post("boards", &json!({ "title": "t" })).await.unwrap();

    assert_eq!(db.store().get(&format!("boards/{key}")).await.unwrap(), json!({ "title": "t" }));
    let seen = db.seen().await;
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn put_and_delete_address_single_records() {
    let db = FakeDatabase::spawn(json!({ "boards": { "K1": { "title": "a", "content": "x" } } }))
        .await
        .unwrap();
    let store = adapter(&db);

    store.put("boards/K1", &json!({ "title": "b" })).await.unwrap();
    assert_eq!(db.store().get("boards/K1").await.unwrap(), json!({ "title": "b" }));

    store.delete("boards/K1").await.unwrap();
    store.delete("boards/K1").await.unwrap();
    assert_eq!(db.store().get("boards/K1").await.unwrap(), Value::Null);

    let seen = db.seen().await;
    assert_eq!(seen[0].method, Method::PUT);
    assert_eq!(seen[0].path, "boards/K1.json");
    assert_eq!(seen[1].method, Method::DELETE);
    assert_eq!(seen[1].content_type, None);
}

#[tokio::test]
async fn auth_token_is_sent_as_query() {
    let db = FakeDatabase::spawn(Value::Null).await.unwrap();
    let store = FirebaseStore::with_auth(
        Url::parse(&db.base_url()).unwrap(),
        Duration::from_secs(5),
        Some(SecretString::from("db-secret".to_owned())),
    )
    .unwrap();

    store.get("boards").await.unwrap();

    assert_eq!(db.seen().await[0].query.as_deref(), Some("auth=db-secret"));
}

#[tokio::test]
async fn non_success_status_maps_to_http_error() {
    let db = FakeDatabase::spawn(Value::Null).await.unwrap();
    db.fail_with(Some(401));
    let store = adapter(&db);

    let err = store.get("boards").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("injected failure"));
}

#[tokio::test]
async fn unreachable_server_maps_to_network_error() {
    // Bind and release a port so nothing is listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = FirebaseStore::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
        Duration::from_secs(2),
    )
    .unwrap();

    let err = store.delete("boards/K1").await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)), "got {err:?}");
}
