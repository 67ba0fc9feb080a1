//! Quiz result handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::identity::IdentityProvider;
use crate::model::AuthUser;
use crate::service::ResultsUpload;
use crate::store::DocumentStore;

use super::AppState;

/// `POST /results`
pub async fn upload<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Json(upload): Json<ResultsUpload>,
) -> Result<impl IntoResponse, ApiError> {
    state.quiz.upload(&caller, upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Quiz Results Inserted." })),
    ))
}

/// `GET /results/user`
pub async fn user_results<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.quiz.user_results(&caller).await?;
    Ok(Json(results))
}

/// `GET /results`
pub async fn leaderboard<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
) -> Result<impl IntoResponse, ApiError> {
    let top = state.quiz.leaderboard().await?;
    Ok(Json(top))
}
