//! Bearer-token authorization gate.
//!
//! Every protected handler takes an [`AuthUser`] extractor. Extraction
//! verifies the `Authorization: Bearer` token against the identity
//! provider, then resolves the uid to a profile document; the handler
//! only runs once both steps succeed. The rejection is the error
//! response, so handlers never see an unauthenticated request.
//!
//! ```text
//! Authorization: Bearer {token}
//!        │
//!        ▼ verify_token          ▼ query users where userId == uid
//!   identity provider  ──uid──▶  document store ──▶ AuthUser { username, role }
//! ```

use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;
use tracing::debug;

use crate::error::{ApiError, IdentityError};
use crate::identity::IdentityProvider;
use crate::model::{collections, AuthUser};
use crate::store::{DocumentStore, Filter, Query};

use super::handlers::AppState;

impl<S, I> FromRequestParts<AppState<S, I>> for AuthUser
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, I>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthenticated("Unauthorized".to_string()))?;

        let uid = state.identity.verify_token(token).await.map_err(|e| match e {
            // Provider outages are server errors, not caller mistakes
            IdentityError::Unavailable(_) => ApiError::Identity(e),
            e => {
                debug!(error = %e, "token verification failed");
                ApiError::Unauthenticated("Unauthorized".to_string())
            }
        })?;

        // The profile document is the source of truth for username and
        // role; a deleted profile invalidates surviving tokens here.
        let mut matches = state
            .store
            .query(
                collections::USERS,
                Query::new()
                    .filter(Filter::eq("userId", uid.as_str()))
                    .limit(1),
            )
            .await?;
        let (username, doc) = matches.pop().ok_or(ApiError::UserNotFound)?;

        let role = doc.get("role").and_then(|v| v.as_i64()).unwrap_or(0);
        Ok(AuthUser { username, role })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Tests
// =============================================================================
