//! Account and profile handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::identity::IdentityProvider;
use crate::model::AuthUser;
use crate::service::{LoginRequest, SignupRequest, UserDetails};
use crate::store::DocumentStore;

use super::AppState;

/// `POST /signup`
pub async fn signup<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.users.signup(req).await?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// `POST /login`
pub async fn login<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.users.login(req).await?;
    Ok(Json(json!({ "tokenId": token })))
}

/// `POST /user`
pub async fn add_details<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Json(details): Json<UserDetails>,
) -> Result<impl IntoResponse, ApiError> {
    state.users.add_details(&caller, details).await?;
    Ok(Json(json!({ "message": "Details added successfully." })))
}

/// `GET /user`
pub async fn authenticated_user<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.authenticated_user(&caller).await?;
    Ok(Json(json!({ "credentials": user })))
}

/// `GET /user/{username}`
pub async fn user_details<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.users.user_details(&username).await?;
    Ok(Json(profile))
}

/// `GET /users/top`
pub async fn top_users<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.users.top_users().await?;
    Ok(Json(users))
}

/// `DELETE /user`
pub async fn delete_account<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state.users.delete_account(&caller).await?;
    Ok(Json(json!({ "message": "User deleted successfully." })))
}
