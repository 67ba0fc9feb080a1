//! Symptom handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::identity::IdentityProvider;
use crate::model::AuthUser;
use crate::service::{SymptomInput, SymptomUpdate};
use crate::store::DocumentStore;

use super::AppState;

/// Body for deletion requests; names the user asking for removal.
#[derive(Debug, Deserialize)]
pub struct DeletionRequest {
    #[serde(default)]
    pub username: String,
}

/// `POST /symptom`
pub async fn create<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Json(input): Json<SymptomInput>,
) -> Result<impl IntoResponse, ApiError> {
    state.symptoms.create(&caller, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Symptom added successfully." })),
    ))
}

/// `GET /symptom/{name}`
pub async fn get<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let symptom = state.symptoms.get(&name).await?;
    Ok(Json(symptom))
}

/// `GET /symptoms`
pub async fn list<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
) -> Result<impl IntoResponse, ApiError> {
    let options = state.symptoms.list().await?;
    Ok(Json(options))
}

/// `POST /symptom/{name}`
pub async fn update<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
    Json(update): Json<SymptomUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    state.symptoms.update(&caller, &name, update).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Information updated successfully." })),
    ))
}

/// `PUT /admin/symptom/{name}`
pub async fn approve<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.symptoms.approve(&caller, &name).await?;
    Ok(Json(json!({ "message": "Symptom approved." })))
}

/// `PUT /delete/symptom/{name}`
pub async fn request_deletion<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
    Json(req): Json<DeletionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .symptoms
        .request_deletion(&caller, &name, &req.username)
        .await?;
    Ok(Json(json!({ "message": "Symptom deletion requested." })))
}

/// `DELETE /symptom/{name}`
pub async fn delete<S: DocumentStore + 'static, I: IdentityProvider + 'static>(
    State(state): State<AppState<S, I>>,
    caller: AuthUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.symptoms.delete(&caller, &name).await?;
    Ok(Json(json!({ "message": "Symptom deleted succesfully." })))
}
