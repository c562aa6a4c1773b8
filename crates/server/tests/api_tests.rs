//! Integration tests for HTTP API endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestServer;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Helper to make JSON requests.
async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

#[tokio::test]
async fn health_check_answers_on_both_spellings() {
    let server = TestServer::new().await;

    for uri in ["/healthcheck", "/health-check"] {
        let (status, body) = json_request(&server.router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert!(body.get("version").is_some());
    }
}

#[tokio::test]
async fn save_then_lookup_roundtrip() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/repository",
        Some(json!({
            "name": "quarry",
            "scm": "git",
            "url": "https://example.com/quarry.git"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("created").and_then(|v| v.as_bool()), Some(true));

    let (status, body) = json_request(
        &server.router,
        "GET",
        "/api/repository/by-url?url=https://example.com/quarry.git",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("name").and_then(|v| v.as_str()), Some("quarry"));

    let row_id = body.get("row_id").and_then(|v| v.as_i64()).unwrap();
    let (status, body) = json_request(
        &server.router,
        "GET",
        &format!("/api/repository/{row_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("scm").and_then(|v| v.as_str()), Some("git"));
}

#[tokio::test]
async fn saving_the_same_url_again_reports_not_created() {
    let server = TestServer::new().await;
    let payload = json!({
        "name": "repeat",
        "scm": "git",
        "url": "https://example.com/repeat.git"
    });

    let (status, body) =
        json_request(&server.router, "POST", "/api/repository", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("created").and_then(|v| v.as_bool()), Some(true));

    let (status, body) =
        json_request(&server.router, "POST", "/api/repository", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("created").and_then(|v| v.as_bool()), Some(false));
}

#[tokio::test]
async fn save_rejects_an_empty_url() {
    let server = TestServer::new().await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/api/repository",
        Some(json!({ "name": "nameless", "scm": "git", "url": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("code").and_then(|v| v.as_str()),
        Some("bad_request")
    );
}

#[tokio::test]
async fn missing_repository_renders_as_not_found() {
    let server = TestServer::new().await;

    let (status, body) = json_request(&server.router, "GET", "/api/repository/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.get("code").and_then(|v| v.as_str()), Some("not_found"));

    let (status, _) = json_request(
        &server.router,
        "GET",
        "/api/repository/by-url?url=https://example.com/absent.git",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_reports_success() {
    let server = TestServer::new().await;

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/api/repository",
        Some(json!({
            "name": "transient",
            "scm": "git",
            "url": "https://example.com/transient.git"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = json_request(
        &server.router,
        "GET",
        "/api/repository/by-url?url=https://example.com/transient.git",
        None,
    )
    .await;
    let row_id = body.get("row_id").and_then(|v| v.as_i64()).unwrap();

    let (status, body) = json_request(
        &server.router,
        "DELETE",
        &format!("/api/repository/{row_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("deleted").and_then(|v| v.as_bool()), Some(true));

    // An id that was never looked up has no cached entry left to answer.
    let (status, _) = json_request(
        &server.router,
        "GET",
        &format!("/api/repository/{}", row_id + 1000),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
