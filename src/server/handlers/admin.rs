//! Admin dashboard handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::identity::IdentityProvider;
use crate::model::AuthUser;
use crate::store::DocumentStore;

use super::AppState;

/// `GET /admin`
pub async fn latest_snapshot<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.admin.latest_snapshot(&caller).await?;
    Ok(Json(snapshot))
}

/// `GET /admin/data/delete`
pub async fn pending_deletions<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let pending = state.admin.pending_deletions(&caller).await?;
    Ok(Json(pending))
}

/// `PUT /admin/user/{username}`
pub async fn upgrade_role<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.admin.upgrade_role(&caller, &username).await?;
    Ok(Json(json!({ "message": "User role increased." })))
}
