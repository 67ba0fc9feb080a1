//! Quiz result endpoint tests.

use axum::http::StatusCode;
use serde_json::json;

use super::test_utils::TestApp;

fn results_body(correct: i64, wrong: i64) -> serde_json::Value {
    json!({
        "answers": [{ "question": "Flu symptom?", "answer": "Fever" }],
        "correctAnswers": correct,
        "wrongAnswers": wrong,
    })
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let app = TestApp::new();
    let (status, _) = app.post("/results", None, results_body(1, 0)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_stores_result_and_counts() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app.post("/results", Some(&token), results_body(8, 2)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Quiz Results Inserted.");

    let (_, body) = app.get("/user", Some(&token)).await;
    assert_eq!(body["credentials"]["quizAnswered"], 1);
}

#[tokio::test]
async fn test_upload_requires_answers() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app
        .post(
            "/results",
            Some(&token),
            json!({ "answers": [], "correctAnswers": 1, "wrongAnswers": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["answers"], "Missing Answers.");
}

#[tokio::test]
async fn test_upload_requires_scores() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let (status, body) = app
        .post(
            "/results",
            Some(&token),
            json!({ "answers": [{ "q": 1 }], "correctAnswers": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["answers"], "Bad Request. Missing Answers.");
}

#[tokio::test]
async fn test_user_results_last_five_newest_first() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    for i in 0..7 {
        app.post("/results", Some(&alice), results_body(i, 0)).await;
        // Millisecond timestamps need distinct instants to order
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    app.post("/results", Some(&bob), results_body(99, 0)).await;

    let (status, body) = app.get("/results/user", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r["answeredBy"] == "alice"));
    assert_eq!(results[0]["correctAnswers"], 6);
    assert_eq!(results[4]["correctAnswers"], 2);
}

#[tokio::test]
async fn test_leaderboard_is_public() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    app.post("/results", Some(&bob), results_body(1, 0)).await;
    app.post("/results", Some(&bob), results_body(1, 0)).await;
    app.post("/results", Some(&alice), results_body(1, 0)).await;

    let (status, body) = app.get("/results", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["username"], "bob");
    assert_eq!(body[0]["quizAnswered"], 2);
    assert_eq!(body[1]["username"], "alice");
}
