//! In-process scenario tests for rc-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot` — no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rc_daemon::{routes, state};
use rc_db::MemoryStore;
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a fresh in-process router backed by a clean in-memory store.
fn make_router() -> axum::Router {
    let st = Arc::new(state::AppState::new(Arc::new(MemoryStore::new())));
    routes::build_router(st)
}

async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn json_body(value: serde_json::Value) -> axum::body::Body {
    axum::body::Body::from(serde_json::to_vec(&value).unwrap())
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let router = make_router();
    let req = Request::builder()
        .method("GET")
        .uri("/v1/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "rc-daemon");
}

// ---------------------------------------------------------------------------
// GET /api/languages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn languages_lists_cpp20() {
    let router = make_router();
    let req = Request::builder()
        .method("GET")
        .uri("/api/languages")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["languages"], serde_json::json!(["c++20"]));
}

// ---------------------------------------------------------------------------
// POST /api/pastes -> GET /api/pastes/:id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_then_fetch_round_trips_pending_paste() {
    let router = make_router();

    let submit_req = Request::builder()
        .method("POST")
        .uri("/api/pastes")
        .header("content-type", "application/json")
        .body(json_body(serde_json::json!({
            "code": "int main(){}",
            "language": "c++20",
            "run": false,
            "stdin": ""
        })))
        .unwrap();

    let (status, body) = call(router.clone(), submit_req).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let submitted = parse_json(body);
    assert_eq!(submitted["message"], "Created");
    let paste_id = submitted["paste_id"].as_str().unwrap().to_string();

    let fetch_req = Request::builder()
        .method("GET")
        .uri(format!("/api/pastes/{paste_id}"))
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, fetch_req).await;
    assert_eq!(status, StatusCode::OK);
    let fetched = parse_json(body);
    assert_eq!(fetched["status"], "pending");
    assert_eq!(fetched["id"], paste_id);
}

#[tokio::test]
async fn submit_rejects_empty_code() {
    let router = make_router();

    let req = Request::builder()
        .method("POST")
        .uri("/api/pastes")
        .header("content-type", "application/json")
        .body(json_body(serde_json::json!({
            "code": "",
            "language": "c++20",
            "run": false,
            "stdin": ""
        })))
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = parse_json(body);
    assert!(json["error"].as_str().unwrap().contains("code"));
}

#[tokio::test]
async fn fetch_unknown_id_is_404() {
    let router = make_router();

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/pastes/{}", uuid::Uuid::new_v4()))
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = call(router, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json = parse_json(body);
    assert_eq!(json["error"], "Paste not found");
}
