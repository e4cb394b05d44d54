//! Integration tests for the burnpaste HTTP API.

mod support;

use axum::http::StatusCode;
use axum_test::TestServer;
use burnpaste_server::store::RedbStore;
use burnpaste_server::{Config, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use support::{setup_test_server, test_config, test_server_for_store};
use tempfile::TempDir;

async fn create(server: &TestServer, body: Value) -> String {
    let response = server.post("/api/pastes").json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_str().expect("id").to_string()
}

async fn create_at(server: &TestServer, body: Value, now_ms: &str) -> String {
    let response = server
        .post("/api/pastes")
        .add_header("x-test-now-ms", now_ms)
        .json(&body)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn test_paste_lifecycle() {
    let (server, _store) = setup_test_server();

    let create_response = server
        .post("/api/pastes")
        .json(&json!({ "content": "line one\nline two ✓" }))
        .await;
    assert_eq!(create_response.status_code(), StatusCode::CREATED);
    let created: Value = create_response.json();
    let id = created["id"].as_str().expect("id");
    assert_eq!(id.len(), 10);
    let url = created["url"].as_str().expect("url");
    assert!(url.starts_with("http://"), "unexpected url {}", url);
    assert!(url.ends_with(&format!("/p/{}", id)), "unexpected url {}", url);

    let peek = server.get(&format!("/api/pastes/{}", id)).await;
    assert_eq!(peek.status_code(), StatusCode::OK);
    let view: Value = peek.json();
    assert_eq!(view["content"], "line one\nline two ✓");
    assert_eq!(view["remaining_views"], Value::Null);
    assert_eq!(view["expires_at"], Value::Null);

    let page = server.get(&format!("/p/{}", id)).await;
    assert_eq!(page.status_code(), StatusCode::OK);
    assert_eq!(page.text(), "line one\nline two ✓");
    page.assert_header("content-type", "text/plain; charset=utf-8");
    page.assert_header("cache-control", "no-store");
    page.assert_header("x-content-type-options", "nosniff");
}

#[tokio::test]
async fn test_locator_uses_public_base_url() {
    let config = Config {
        public_base_url: Some("https://burn.example".to_string()),
        ..test_config()
    };
    let server = test_server_for_store(config, Arc::new(MemoryStore::default()));

    let response = server
        .post("/api/pastes")
        .json(&json!({ "content": "x" }))
        .await;
    let created: Value = response.json();
    let id = created["id"].as_str().expect("id");
    assert_eq!(
        created["url"].as_str(),
        Some(format!("https://burn.example/p/{}", id).as_str())
    );
}

#[tokio::test]
async fn test_single_view_paste_burns_after_first_read() {
    let (server, store) = setup_test_server();
    let id = create(&server, json!({ "content": "hello", "max_views": 1 })).await;

    let first = server.get(&format!("/p/{}", id)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(first.text(), "hello");
    assert!(store.is_empty());

    let second = server.get(&format!("/p/{}", id)).await;
    assert_eq!(second.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(second.text(), "Not found");

    let peek = server.get(&format!("/api/pastes/{}", id)).await;
    assert_eq!(peek.status_code(), StatusCode::NOT_FOUND);
    let body: Value = peek.json();
    assert_eq!(body, json!({ "error": "not found" }));
}

#[tokio::test]
async fn test_view_budget_counts_down_and_peek_is_free() {
    let (server, _store) = setup_test_server();
    let id = create(&server, json!({ "content": "twice", "max_views": 2 })).await;

    for _ in 0..3 {
        let peek: Value = server.get(&format!("/api/pastes/{}", id)).await.json();
        assert_eq!(peek["remaining_views"], 2);
    }

    let first = server.get(&format!("/p/{}", id)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let peek: Value = server.get(&format!("/api/pastes/{}", id)).await.json();
    assert_eq!(peek["remaining_views"], 1);

    assert_eq!(
        server.get(&format!("/p/{}", id)).await.status_code(),
        StatusCode::OK
    );
    assert_eq!(
        server.get(&format!("/p/{}", id)).await.status_code(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_ttl_boundary_with_test_clock_header() {
    let (server, store) = setup_test_server();
    let id = create_at(&server, json!({ "content": "soon gone", "ttl_seconds": 60 }), "0").await;

    let early = server
        .get(&format!("/api/pastes/{}", id))
        .add_header("x-test-now-ms", "59999")
        .await;
    assert_eq!(early.status_code(), StatusCode::OK);
    let view: Value = early.json();
    assert_eq!(view["expires_at"], "1970-01-01T00:01:00.000Z");

    let expired = server
        .get(&format!("/p/{}", id))
        .add_header("x-test-now-ms", "60000")
        .await;
    assert_eq!(expired.status_code(), StatusCode::NOT_FOUND);
    assert!(store.is_empty());

    let rewound = server
        .get(&format!("/api/pastes/{}", id))
        .add_header("x-test-now-ms", "1")
        .await;
    assert_eq!(rewound.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_consume_near_deadline_survives_wall_clock_delay() {
    let (server, _store) = setup_test_server();
    let id = create_at(&server, json!({ "content": "late", "ttl_seconds": 60 }), "0").await;

    let page = server
        .get(&format!("/p/{}", id))
        .add_header("x-test-now-ms", "59000")
        .await;
    assert_eq!(page.status_code(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(1_200)).await;

    let peek = server
        .get(&format!("/api/pastes/{}", id))
        .add_header("x-test-now-ms", "59500")
        .await;
    assert_eq!(peek.status_code(), StatusCode::OK);
    assert_eq!(peek.json::<Value>()["content"], "late");
}

#[tokio::test]
async fn test_clock_header_is_ignored_outside_test_mode() {
    let config = Config {
        test_mode: false,
        ..test_config()
    };
    let server = test_server_for_store(config, Arc::new(MemoryStore::default()));
    let id = create(&server, json!({ "content": "x", "ttl_seconds": 60 })).await;

    // Far-future header would expire the paste if it were honoured.
    let response = server
        .get(&format!("/api/pastes/{}", id))
        .add_header("x-test-now-ms", "99999999999999")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_clock_header_falls_back_to_service_clock() {
    let (server, _store) = setup_test_server();
    let id = create(&server, json!({ "content": "x", "ttl_seconds": 60 })).await;

    let response = server
        .get(&format!("/api/pastes/{}", id))
        .add_header("x-test-now-ms", "tomorrow")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let (server, store) = setup_test_server();
    let cases = [
        (json!({}), "content"),
        (json!({ "content": "" }), "content"),
        (json!({ "content": "x", "ttl_seconds": 0 }), "ttl_seconds"),
        (json!({ "content": "x", "ttl_seconds": -1 }), "ttl_seconds"),
        (json!({ "content": "x", "ttl_seconds": 1.5 }), "ttl_seconds"),
        (json!({ "content": "x", "max_views": 0 }), "max_views"),
        (json!({ "content": "x", "max_views": 2.5 }), "max_views"),
    ];

    for (body, fragment) in cases {
        let response = server.post("/api/pastes").json(&body).await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "body: {}",
            body
        );
        let error: Value = response.json();
        let message = error["error"].as_str().expect("error message");
        assert!(message.contains(fragment), "body: {} message: {}", body, message);
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_create_rejects_wrongly_typed_and_malformed_bodies() {
    let (server, store) = setup_test_server();

    let non_string = server
        .post("/api/pastes")
        .json(&json!({ "content": 42 }))
        .await;
    assert_eq!(non_string.status_code(), StatusCode::BAD_REQUEST);

    let string_ttl = server
        .post("/api/pastes")
        .json(&json!({ "content": "x", "ttl_seconds": "60" }))
        .await;
    assert_eq!(string_ttl.status_code(), StatusCode::BAD_REQUEST);

    let malformed = server.post("/api/pastes").text("{not json").await;
    assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_create_accepts_null_policies_and_integral_floats() {
    let (server, _store) = setup_test_server();
    let id = create(
        &server,
        json!({ "content": "x", "ttl_seconds": null, "max_views": 3.0 }),
    )
    .await;

    let view: Value = server.get(&format!("/api/pastes/{}", id)).await.json();
    assert_eq!(view["remaining_views"], 3);
    assert_eq!(view["expires_at"], Value::Null);
}

#[tokio::test]
async fn test_oversized_content_is_rejected() {
    let config = Config {
        max_paste_size: 16,
        ..test_config()
    };
    let store = Arc::new(MemoryStore::default());
    let server = test_server_for_store(config, store.clone());

    let response = server
        .post("/api/pastes")
        .json(&json!({ "content": "x".repeat(17) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let (server, _store) = setup_test_server();
    for path in [
        "/api/pastes/AAAAAAAAAA",
        "/api/pastes/short",
        "/api/pastes/has%20space!",
        "/p/AAAAAAAAAA",
        "/p/..%2F..%2Fetc",
    ] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "path: {}", path);
    }
}

#[tokio::test]
async fn test_healthz_reports_store_liveness() {
    let (server, store) = setup_test_server();

    let healthy = server.get("/api/healthz").await;
    assert_eq!(healthy.status_code(), StatusCode::OK);
    assert_eq!(healthy.json::<Value>(), json!({ "ok": true }));

    store.set_offline(true);
    let unhealthy = server.get("/api/healthz").await;
    assert_eq!(unhealthy.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(unhealthy.json::<Value>(), json!({ "ok": false }));
}

#[tokio::test]
async fn test_store_outage_maps_to_service_unavailable() {
    let (server, store) = setup_test_server();
    let id = create(&server, json!({ "content": "x" })).await;
    store.set_offline(true);

    let create_response = server
        .post("/api/pastes")
        .json(&json!({ "content": "y" }))
        .await;
    assert_eq!(
        create_response.status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    let peek = server.get(&format!("/api/pastes/{}", id)).await;
    assert_eq!(peek.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let page = server.get(&format!("/p/{}", id)).await;
    assert_eq!(page.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_redb_backed_server_round_trip() {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let store = Arc::new(RedbStore::open(db_path.to_str().expect("db path")).expect("open redb"));
    let server = test_server_for_store(test_config(), store);

    let id = create(&server, json!({ "content": "persisted", "max_views": 2 })).await;
    assert_eq!(server.get(&format!("/p/{}", id)).await.text(), "persisted");

    let view: Value = server.get(&format!("/api/pastes/{}", id)).await.json();
    assert_eq!(view["remaining_views"], 1);

    assert_eq!(server.get(&format!("/p/{}", id)).await.text(), "persisted");
    assert_eq!(
        server.get(&format!("/p/{}", id)).await.status_code(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (server, _store) = setup_test_server();
    let response = server
        .get("/api/healthz")
        .add_header("origin", "https://elsewhere.example")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.assert_header("access-control-allow-origin", "*");
}
