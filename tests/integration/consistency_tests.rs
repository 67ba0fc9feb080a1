//! End-to-end consistency worker tests: deletions through the API leave
//! no dangling references once the worker settles.

use serde_json::json;

use bioflash_api::model::collections;

use super::test_utils::{symptom_body, virus_body, TestApp};

#[tokio::test]
async fn test_symptom_deletion_prunes_virus_references() {
    let mut app = TestApp::new();
    let alice = app.signup("alice").await;
    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;
    app.post("/symptom", Some(&alice), symptom_body("cough"))
        .await;
    app.post(
        "/virus",
        Some(&alice),
        virus_body("flu", &["fever", "cough"]),
    )
    .await;

    app.delete("/symptom/Fever", Some(&alice)).await;
    app.settle().await;

    let flu = app.doc(collections::VIRUSES, "Flu").await.unwrap();
    assert_eq!(flu["symptoms"], json!(["Cough"]));
}

#[tokio::test]
async fn test_user_deletion_cascades_and_chains_into_pruning() {
    let mut app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    app.post("/symptom", Some(&alice), symptom_body("fever"))
        .await;
    app.post("/symptom", Some(&bob), symptom_body("rash")).await;
    app.post("/virus", Some(&alice), virus_body("flu", &["fever"]))
        .await;
    app.post(
        "/virus",
        Some(&bob),
        virus_body("measles", &["fever", "rash"]),
    )
    .await;

    app.delete("/user", Some(&alice)).await;
    app.settle().await;

    // Alice's authored content is gone
    assert!(app.doc(collections::SYMPTOMS, "Fever").await.is_none());
    assert!(app.doc(collections::VIRUSES, "Flu").await.is_none());

    // Bob's virus survives but the cascaded symptom was pruned from it
    let measles = app.doc(collections::VIRUSES, "Measles").await.unwrap();
    assert_eq!(measles["symptoms"], json!(["Rash"]));
    assert!(app.doc(collections::SYMPTOMS, "Rash").await.is_some());
}
