//! Symptom endpoint tests: creation, listing, ownership, moderation.

use axum::http::StatusCode;
use serde_json::json;

use bioflash_api::model::collections;

use super::test_utils::{symptom_body, TestApp};

#[tokio::test]
async fn test_create_title_cases_and_counts() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app
        .post("/symptom", Some(&token), symptom_body("sore throat"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Symptom added successfully.");

    let doc = app.doc(collections::SYMPTOMS, "Sore Throat").await.unwrap();
    assert_eq!(doc["name"], "Sore Throat");
    assert_eq!(doc["createdBy"], "alice");
    assert_eq!(doc["approved"], false);
    assert_eq!(doc["specialty"], "General Medicine");

    let user = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(user["symptomsMade"], 1);
}

#[tokio::test]
async fn test_trusted_author_is_pre_approved() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.set_role("alice", 1).await;

    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;
    let doc = app.doc(collections::SYMPTOMS, "Fever").await.unwrap();
    assert_eq!(doc["approved"], true);
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;

    // Same key after title-casing
    let (status, body) = app
        .post("/symptom", Some(&token), symptom_body("FEVER"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "This symptom already exists.");

    let user = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(user["symptomsMade"], 1);
}

#[tokio::test]
async fn test_empty_name_rejected() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app
        .post("/symptom", Some(&token), json!({ "name": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "Please write symptom name.");
}

#[tokio::test]
async fn test_list_enumerates_options() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;
    app.post("/symptom", Some(&token), symptom_body("cough"))
        .await;

    let (status, body) = app.get("/symptoms", None).await;
    assert_eq!(status, StatusCode::OK);
    // Key order, enumerated from zero
    assert_eq!(body[0], json!({ "key": 0, "text": "Cough", "value": "Cough" }));
    assert_eq!(body[1], json!({ "key": 1, "text": "Fever", "value": "Fever" }));
}

#[tokio::test]
async fn test_get_unknown_404() {
    let app = TestApp::new();
    let (status, body) = app.get("/symptom/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Symptom not found.");
}

#[tokio::test]
async fn test_update_is_owner_only() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;

    let update = json!({ "description": "Temperature above 38C" });
    let (status, body) = app
        .post("/symptom/Fever", Some(&bob), update.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized.");

    let (status, body) = app.post("/symptom/Fever", Some(&alice), update).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Information updated successfully.");

    let doc = app.doc(collections::SYMPTOMS, "Fever").await.unwrap();
    assert_eq!(doc["description"], "Temperature above 38C");
    assert!(doc["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_approve_requires_admin_role() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;

    let (status, body) = app
        .put("/admin/symptom/Fever", Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized Access.");

    let admin = app.signup_admin("mod").await;
    let (status, body) = app
        .put("/admin/symptom/Fever", Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Symptom approved.");

    let doc = app.doc(collections::SYMPTOMS, "Fever").await.unwrap();
    assert_eq!(doc["approved"], true);
}

#[tokio::test]
async fn test_deletion_request_must_name_caller() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;

    let (status, body) = app
        .put(
            "/delete/symptom/Fever",
            Some(&alice),
            json!({ "username": "bob" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized Access.");

    let (status, body) = app
        .put(
            "/delete/symptom/Fever",
            Some(&alice),
            json!({ "username": "alice" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Symptom deletion requested.");

    let doc = app.doc(collections::SYMPTOMS, "Fever").await.unwrap();
    assert_eq!(doc["pendingDeletion"], true);
}

#[tokio::test]
async fn test_delete_is_owner_only_and_decrements() {
    let mut app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;

    let (status, _) = app.delete("/symptom/Fever", Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete("/symptom/Fever", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Symptom deleted succesfully.");
    app.settle().await;

    assert!(app.doc(collections::SYMPTOMS, "Fever").await.is_none());
    let user = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(user["symptomsMade"], 0);
}
