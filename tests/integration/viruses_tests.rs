//! Virus endpoint tests, centered on symptom reference validation.

use axum::http::StatusCode;
use serde_json::json;

use bioflash_api::model::collections;

use super::test_utils::{symptom_body, virus_body, TestApp};

#[tokio::test]
async fn test_create_resolves_symptom_references() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;
    app.post("/symptom", Some(&token), symptom_body("cough"))
        .await;

    // Mixed casing and a duplicate entry normalize away
    let (status, body) = app
        .post(
            "/virus",
            Some(&token),
            virus_body("flu", &["FEVER", "cough", "fever"]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Virus created successfully.");

    let doc = app.doc(collections::VIRUSES, "Flu").await.unwrap();
    assert_eq!(doc["symptoms"], json!(["Fever", "Cough"]));
    assert_eq!(doc["type"], "Airborne");

    let user = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(user["virusesMade"], 1);
}

#[tokio::test]
async fn test_unknown_symptom_writes_nothing() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;

    let (status, body) = app
        .post(
            "/virus",
            Some(&token),
            virus_body("flu", &["fever", "tentacles"]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Symptoms do not match the existing ones.");
    assert_eq!(body["missing"], json!(["Tentacles"]));

    assert!(app.doc(collections::VIRUSES, "Flu").await.is_none());
    let user = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(user["virusesMade"], 0);
}

#[tokio::test]
async fn test_create_requires_symptoms() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app
        .post("/virus", Some(&token), virus_body("flu", &[]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["symptoms"], "Please add symptoms of the virus.");
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;
    app.post("/virus", Some(&token), virus_body("flu", &["fever"]))
        .await;

    let (status, body) = app
        .post("/virus", Some(&token), virus_body("FLU", &["fever"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "This virus already exists.");
}

#[tokio::test]
async fn test_list_returns_summaries() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;
    app.post("/virus", Some(&token), virus_body("flu", &["fever"]))
        .await;

    let (status, body) = app.get("/viruses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[0],
        json!({ "name": "Flu", "symptoms": ["Fever"], "critical": false })
    );
}

#[tokio::test]
async fn test_update_revalidates_symptom_list() {
    let app = TestApp::new();
    let token = app.signup("alice").await;
    app.post("/symptom", Some(&token), symptom_body("fever"))
        .await;
    app.post("/symptom", Some(&token), symptom_body("cough"))
        .await;
    app.post("/virus", Some(&token), virus_body("flu", &["fever"]))
        .await;

    // An invalid replacement list leaves the stored one intact
    let (status, _) = app
        .post(
            "/virus/Flu",
            Some(&token),
            json!({ "symptoms": ["tentacles"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let doc = app.doc(collections::VIRUSES, "Flu").await.unwrap();
    assert_eq!(doc["symptoms"], json!(["Fever"]));

    let (status, body) = app
        .post(
            "/virus/Flu",
            Some(&token),
            json!({ "symptoms": ["cough", "fever"], "duration": "10 days" }),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Information updated successfully.");

    let doc = app.doc(collections::VIRUSES, "Flu").await.unwrap();
    assert_eq!(doc["symptoms"], json!(["Cough", "Fever"]));
    assert_eq!(doc["duration"], "10 days");
    assert!(doc["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_approve_and_deletion_request_gates() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;
    app.post("/virus", Some(&alice), virus_body("flu", &["fever"]))
        .await;

    let (status, _) = app.put("/admin/virus/Flu", Some(&alice), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.signup_admin("mod").await;
    let (status, body) = app.put("/admin/virus/Flu", Some(&admin), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Virus approved.");

    let (status, body) = app
        .put(
            "/delete/virus/Flu",
            Some(&alice),
            json!({ "username": "alice" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Virus deletion requested.");

    let doc = app.doc(collections::VIRUSES, "Flu").await.unwrap();
    assert_eq!(doc["approved"], true);
    assert_eq!(doc["pendingDeletion"], true);
}

#[tokio::test]
async fn test_delete_is_owner_only_even_for_admins() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let admin = app.signup_admin("mod").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;
    app.post("/virus", Some(&alice), virus_body("flu", &["fever"]))
        .await;

    let (status, body) = app.delete("/virus/Flu", Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized.");

    let (status, body) = app.delete("/virus/Flu", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Virus deleted succesfully.");

    assert!(app.doc(collections::VIRUSES, "Flu").await.is_none());
    let user = app.doc(collections::USERS, "alice").await.unwrap();
    assert_eq!(user["virusesMade"], 0);
}
