//! Virus handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::identity::IdentityProvider;
use crate::model::AuthUser;
use crate::service::{VirusInput, VirusUpdate};
use crate::store::DocumentStore;

use super::symptoms::DeletionRequest;
use super::AppState;

/// `POST /virus`
pub async fn create<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Json(input): Json<VirusInput>,
) -> Result<impl IntoResponse, ApiError> {
    state.viruses.create(&caller, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Virus created successfully." })),
    ))
}

/// `GET /virus/{name}`
pub async fn get<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let virus = state.viruses.get(&name).await?;
    Ok(Json(virus))
}

/// `GET /viruses`
pub async fn list<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.viruses.list().await?;
    Ok(Json(summaries))
}

/// `POST /virus/{name}`
pub async fn update<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
    Json(update): Json<VirusUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    state.viruses.update(&caller, &name, update).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Information updated successfully." })),
    ))
}

/// `PUT /admin/virus/{name}`
pub async fn approve<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.viruses.approve(&caller, &name).await?;
    Ok(Json(json!({ "message": "Virus approved." })))
}

/// `PUT /delete/virus/{name}`
pub async fn request_deletion<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
    Json(req): Json<DeletionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .viruses
        .request_deletion(&caller, &name, &req.username)
        .await?;
    Ok(Json(json!({ "message": "Virus deletion requested." })))
}

/// `DELETE /virus/{name}`
pub async fn delete<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.viruses.delete(&caller, &name).await?;
    Ok(Json(json!({ "message": "Virus deleted succesfully." })))
}
