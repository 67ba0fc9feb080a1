//! Authentication gate tests.
//!
//! Protected routes must reject requests before touching any data: a
//! missing or bad token never reaches the handler.

use axum::http::StatusCode;
use serde_json::json;

use bioflash_api::model::collections;
use bioflash_api::store::DocumentStore;

use super::test_utils::{symptom_body, TestApp};

#[tokio::test]
async fn test_missing_bearer_rejected_and_nothing_written() {
    let app = TestApp::new();

    let (status, body) = app.post("/symptom", None, symptom_body("fever")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    // The gate fired before the handler; no document exists
    assert!(app.doc(collections::SYMPTOMS, "Fever").await.is_none());
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/symptom", Some("not-a-real-token"), symptom_body("fever"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_resolves_profile() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app.get("/user", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"]["username"], "alice");
    assert_eq!(body["credentials"]["role"], 0);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new();
    app.signup("alice").await;

    // Forge a token that expired 100 seconds ago
    let expired = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
        - 100;
    let token = app.identity.issue_token_with_expiry("some-uid", expired);

    let (status, _) = app.get("/user", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_with_deleted_profile_rejected() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    // Remove the profile behind the still-valid token
    app.store
        .delete(collections::USERS, "alice")
        .await
        .unwrap();

    let (status, body) = app.get("/user", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User not found.");
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;

    for uri in [
        "/health",
        "/symptoms",
        "/symptom/fever",
        "/viruses",
        "/user/alice",
        "/users/top",
        "/results",
    ] {
        let (status, _) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::OK, "expected 200 for {}", uri);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_login_token_round_trip() {
    let app = TestApp::new();
    app.signup("alice").await;

    let (status, body) = app
        .post(
            "/login",
            None,
            json!({ "email": "alice@example.com", "password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["tokenId"].as_str().unwrap();
    let (status, body) = app.get("/user", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"]["username"], "alice");
}
