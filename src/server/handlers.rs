//! HTTP request handlers for the BioFlash API.
//!
//! Handlers are thin: deserialize the request, call one service method,
//! map the result to a status and a JSON body. All failure mapping lives
//! in the [`IntoResponse`] impl for [`ApiError`] below.

pub mod admin;
pub mod quiz;
pub mod symptoms;
pub mod users;
pub mod viruses;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::error::{ApiError, IdentityError};
use crate::identity::IdentityProvider;
use crate::service::{AdminService, QuizService, SymptomService, UserService, VirusService};
use crate::store::DocumentStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state: one service per collection plus the raw
/// store and identity handles the auth gate needs.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: DocumentStore, I: IdentityProvider> {
    pub users: Arc<UserService<S, I>>,
    pub symptoms: Arc<SymptomService<S>>,
    pub viruses: Arc<VirusService<S>>,
    pub quiz: Arc<QuizService<S>>,
    pub admin: Arc<AdminService<S>>,

    /// Used by the auth gate to resolve uids to profiles.
    pub store: Arc<S>,

    /// Used by the auth gate to verify bearer tokens.
    pub identity: Arc<I>,
}

impl<S: DocumentStore, I: IdentityProvider> AppState<S, I> {
    pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
        Self {
            users: Arc::new(UserService::new(Arc::clone(&store), Arc::clone(&identity))),
            symptoms: Arc::new(SymptomService::new(Arc::clone(&store))),
            viruses: Arc::new(VirusService::new(Arc::clone(&store))),
            quiz: Arc::new(QuizService::new(Arc::clone(&store))),
            admin: Arc::new(AdminService::new(Arc::clone(&store))),
            store,
            identity,
        }
    }
}

impl<S: DocumentStore, I: IdentityProvider> Clone for AppState<S, I> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            symptoms: Arc::clone(&self.symptoms),
            viruses: Arc::clone(&self.viruses),
            quiz: Arc::clone(&self.quiz),
            admin: Arc::clone(&self.admin),
            store: Arc::clone(&self.store),
            identity: Arc::clone(&self.identity),
        }
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert [`ApiError`] to an HTTP response.
///
/// Validation and conflict errors serialize as a field-to-message map so
/// forms can attach each message to its input; everything else uses an
/// `{"error": ...}` body. 5xx responses are logged at ERROR, auth
/// failures at WARN or DEBUG, the rest at DEBUG.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, json!(errors)),

            ApiError::Unauthenticated(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }

            ApiError::Unauthorized(message) => {
                (StatusCode::FORBIDDEN, json!({ "error": message }))
            }

            ApiError::UserNotFound => (
                StatusCode::FORBIDDEN,
                json!({ "error": "User not found." }),
            ),

            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{} not found.", what) }),
            ),

            ApiError::AlreadyExists { field, message } => {
                let mut body = serde_json::Map::new();
                body.insert(field.clone(), json!(message));
                (StatusCode::BAD_REQUEST, serde_json::Value::Object(body))
            }

            ApiError::InvalidReference { message, missing } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "missing": missing }),
            ),

            // Wrong credentials on login; the client shows this under the
            // whole form rather than one field
            ApiError::Identity(IdentityError::InvalidCredentials) => (
                StatusCode::FORBIDDEN,
                json!({ "general": "Wrong credentials. Please try again." }),
            ),

            ApiError::Identity(IdentityError::EmailTaken) => (
                StatusCode::BAD_REQUEST,
                json!({ "email": "Email is already in use" }),
            ),

            ApiError::Identity(IdentityError::InvalidToken)
            | ApiError::Identity(IdentityError::TokenExpired { .. }) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }

            ApiError::Store(_) | ApiError::Identity(IdentityError::Unavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error." }),
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", self);
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "request rejected: {}", self);
        } else {
            debug!(status = status.as_u16(), "request rejected: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
