//! Admin dashboard and role management tests.

use axum::http::StatusCode;
use serde_json::json;

use bioflash_api::model::collections;

use super::test_utils::{symptom_body, virus_body, TestApp};

#[tokio::test]
async fn test_snapshot_requires_exact_admin_role() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    for role in [0, 1, 2, 4] {
        app.set_role("alice", role).await;
        let (status, body) = app.get("/admin", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "role {} passed the gate", role);
        assert_eq!(body["error"], "Forbidden Access");
    }

    app.set_role("alice", 3).await;
    let (status, _) = app.get("/admin", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_snapshot_shape() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    // Millisecond timestamps need distinct instants to order
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let admin = app.signup_admin("mod").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;
    app.post("/virus", Some(&alice), virus_body("flu", &["fever"]))
        .await;

    let (status, body) = app.get("/admin", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    // Unapproved content and role-0 users surface for moderation
    assert_eq!(body["symptoms"][0]["name"], "Fever");
    assert_eq!(body["viruses"][0]["name"], "Flu");
    assert_eq!(body["approveUsers"][0]["username"], "alice");
    // Newest users first
    let users = body["users"].as_array().unwrap();
    assert_eq!(users[0]["username"], "mod");
    assert_eq!(users[1]["username"], "alice");
}

#[tokio::test]
async fn test_approved_content_leaves_snapshot() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let admin = app.signup_admin("mod").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;

    app.put("/admin/symptom/Fever", Some(&admin), json!({}))
        .await;

    let (_, body) = app.get("/admin", Some(&admin)).await;
    assert!(body["symptoms"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_deletions_listing() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let admin = app.signup_admin("mod").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;
    app.post("/symptom", Some(&alice), symptom_body("cough"))
        .await;
    app.put(
        "/delete/symptom/Fever",
        Some(&alice),
        json!({ "username": "alice" }),
    )
    .await;

    let (status, _) = app.get("/admin/data/delete", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/admin/data/delete", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let symptoms = body["symptoms"].as_array().unwrap();
    assert_eq!(symptoms.len(), 1);
    assert_eq!(symptoms[0]["name"], "Fever");
    assert!(body["viruses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_role_upgrade() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let admin = app.signup_admin("mod").await;

    let (status, body) = app
        .put("/admin/user/alice", Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized Access.");

    let (status, body) = app.put("/admin/user/alice", Some(&admin), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User role increased.");

    let doc = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(doc["role"], 1);

    let (status, body) = app.put("/admin/user/ghost", Some(&admin), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found.");
}
