//! Quiz result uploads and leaderboards.
//!
//! Results are append-only: nothing updates or deletes a quiz document, so
//! the collection needs no moderation or ownership machinery.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{collections, from_document, timestamp, to_document, AuthUser, QuizResult, User};
use crate::store::{DocumentStore, Filter, Patch, Query, WriteBatch};

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsUpload {
    #[serde(default)]
    pub answers: Vec<Value>,
    #[serde(default)]
    pub correct_answers: Option<i64>,
    #[serde(default)]
    pub wrong_answers: Option<i64>,
}

// =============================================================================
// Service
// =============================================================================

/// Quiz result storage and ranking queries.
pub struct QuizService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> QuizService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Store a quiz run under a generated id and bump the caller's
    /// `quizAnswered` counter in the same batch. Returns the id.
    pub async fn upload(&self, caller: &AuthUser, upload: ResultsUpload) -> Result<String, ApiError> {
        if upload.answers.is_empty() {
            return Err(ApiError::validation("answers", "Missing Answers."));
        }
        let (correct_answers, wrong_answers) = match (upload.correct_answers, upload.wrong_answers)
        {
            (Some(correct), Some(wrong)) => (correct, wrong),
            _ => {
                return Err(ApiError::validation(
                    "answers",
                    "Bad Request. Missing Answers.",
                ))
            }
        };

        let result = QuizResult {
            answered_by: caller.username.clone(),
            answered_at: timestamp(),
            answers: upload.answers,
            correct_answers,
            wrong_answers,
        };

        let key = Uuid::new_v4().to_string();
        let batch = WriteBatch::new()
            .create(collections::QUIZ, &key, to_document(&result)?)
            .update(
                collections::USERS,
                &caller.username,
                Patch::new().increment("quizAnswered", 1),
            );
        self.store.commit(batch).await?;

        debug!(result = %key, answered_by = %caller.username, "quiz result stored");
        Ok(key)
    }

    /// The caller's five most recent results, newest first.
    pub async fn user_results(&self, caller: &AuthUser) -> Result<Vec<QuizResult>, ApiError> {
        let results = self
            .store
            .query(
                collections::QUIZ,
                Query::new()
                    .filter(Filter::eq("answeredBy", caller.username.as_str()))
                    .order_desc("answeredAt")
                    .limit(5),
            )
            .await?;

        Ok(results
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect::<Result<Vec<QuizResult>, _>>()?)
    }

    /// Top 5 users by quizzes answered. Public.
    pub async fn leaderboard(&self) -> Result<Vec<User>, ApiError> {
        let results = self
            .store
            .query(
                collections::USERS,
                Query::new().order_desc("quizAnswered").limit(5),
            )
            .await?;

        Ok(results
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect::<Result<Vec<User>, _>>()?)
    }
}

// =============================================================================
// Tests
// =============================================================================
