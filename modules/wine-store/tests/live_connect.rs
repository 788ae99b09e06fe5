//! Smoke test: connect to a running MongoDB.
//! Run with: MONGODB_URI=mongodb://... cargo test -p wine-store --test live_connect -- --ignored

use wine_store::{doc, WineStore};

#[tokio::test]
#[ignore] // requires a live MongoDB
async fn live_connect() {
    let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI required");

    let store = WineStore::connect(&uri, None)
        .await
        .expect("Failed to connect");

    let reply = store
        .inner()
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .unwrap();
    let ok = reply
        .get("ok")
        .and_then(|v| v.as_f64().or_else(|| v.as_i32().map(f64::from)))
        .expect("ping reply has no numeric ok field");
    assert_eq!(ok, 1.0);
}

#[tokio::test]
async fn connection_string_is_validated_before_connecting() {
    let err = WineStore::connect("not-a-uri", None).await.err().expect("should fail");
    assert!(err.to_string().contains("Connection error"));
}
