//! User account and profile operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, FieldErrors, StoreError};
use crate::identity::IdentityProvider;
use crate::model::{
    collections, from_document, is_valid_email, is_valid_username, to_document, AuthUser, Symptom,
    User, Virus,
};
use crate::store::{DocumentStore, Filter, Patch, Query};

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Optional profile fields; only non-empty values are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A user together with everything they authored, newest first.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub viruses: Vec<Virus>,
    pub symptoms: Vec<Symptom>,
}

// =============================================================================
// Service
// =============================================================================

/// Signup, login, and profile operations.
pub struct UserService<S: DocumentStore, I: IdentityProvider> {
    store: Arc<S>,
    identity: Arc<I>,
}

impl<S: DocumentStore, I: IdentityProvider> UserService<S, I> {
    pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
        Self { store, identity }
    }

    /// Create an identity account and the matching profile document.
    ///
    /// Returns a bearer token for the new account.
    pub async fn signup(&self, req: SignupRequest) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();

        if req.email.trim().is_empty() {
            errors.insert("email".to_string(), "Must not be empty.".to_string());
        } else if !is_valid_email(&req.email) {
            errors.insert(
                "email".to_string(),
                "Must be a valid email address.".to_string(),
            );
        }

        if req.password.is_empty() {
            errors.insert("password".to_string(), "Must not be empty.".to_string());
        } else if req.password != req.confirm_password {
            errors.insert("password".to_string(), "Passwords must match.".to_string());
        }

        if req.username.trim().is_empty() {
            errors.insert("username".to_string(), "Must not be empty.".to_string());
        } else if !is_valid_username(&req.username) {
            errors.insert(
                "username".to_string(),
                "Only use characters, numbers and _.".to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        // The username is the profile key; claim it before touching the
        // identity layer so a taken name costs nothing there.
        if self
            .store
            .get(collections::USERS, &req.username)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists {
                field: "username".to_string(),
                message: "this username is taken.".to_string(),
            });
        }

        let account = self
            .identity
            .create_account(req.email.trim(), &req.password)
            .await?;

        let user = User::new(req.username.clone(), req.email.trim().to_string(), account.uid);
        self.store
            .create(collections::USERS, &req.username, to_document(&user)?)
            .await?;

        debug!(username = %req.username, "user signed up");
        Ok(account.token)
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, req: LoginRequest) -> Result<String, ApiError> {
        let mut errors = FieldErrors::new();
        if req.email.trim().is_empty() || !is_valid_email(&req.email) {
            errors.insert(
                "email".to_string(),
                "Must match an email address.".to_string(),
            );
        }
        if req.password.is_empty() {
            errors.insert("password".to_string(), "Must not be empty.".to_string());
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let token = self.identity.sign_in(req.email.trim(), &req.password).await?;
        Ok(token)
    }

    /// Apply the non-empty profile fields to the caller's document.
    pub async fn add_details(
        &self,
        caller: &AuthUser,
        details: UserDetails,
    ) -> Result<(), ApiError> {
        let mut patch = Patch::new();
        for (field, value) in [
            ("about", details.about),
            ("location", details.location),
            ("firstName", details.first_name),
            ("lastName", details.last_name),
            ("gender", details.gender),
        ] {
            if let Some(value) = value {
                if !value.trim().is_empty() {
                    patch = patch.set(field, value);
                }
            }
        }

        if patch.is_empty() {
            return Ok(());
        }

        self.store
            .update(collections::USERS, &caller.username, patch)
            .await
            .map_err(user_not_found)?;
        Ok(())
    }

    /// The caller's own profile document.
    pub async fn authenticated_user(&self, caller: &AuthUser) -> Result<User, ApiError> {
        let doc = self
            .store
            .get(collections::USERS, &caller.username)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        Ok(from_document(doc)?)
    }

    /// A public profile with all authored viruses and symptoms, newest
    /// first.
    pub async fn user_details(&self, username: &str) -> Result<UserProfile, ApiError> {
        let doc = self
            .store
            .get(collections::USERS, username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;
        let user: User = from_document(doc)?;

        let authored = Query::new()
            .filter(Filter::eq("createdBy", username))
            .order_desc("createdAt");

        let viruses = self
            .store
            .query(collections::VIRUSES, authored.clone())
            .await?
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect::<Result<Vec<Virus>, _>>()?;

        let symptoms = self
            .store
            .query(collections::SYMPTOMS, authored)
            .await?
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect::<Result<Vec<Symptom>, _>>()?;

        Ok(UserProfile {
            user,
            viruses,
            symptoms,
        })
    }

    /// Top 5 users by symptoms made, then viruses made.
    pub async fn top_users(&self) -> Result<Vec<User>, ApiError> {
        let results = self
            .store
            .query(
                collections::USERS,
                Query::new()
                    .order_desc("symptomsMade")
                    .order_desc("virusesMade")
                    .limit(5),
            )
            .await?;

        Ok(results
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect::<Result<Vec<User>, _>>()?)
    }

    /// Delete the caller's own account.
    ///
    /// Deleting the profile document fires the consistency worker's
    /// cascade. The identity account removal afterwards is best-effort: if
    /// it fails, any surviving token dies at the gate's profile lookup.
    pub async fn delete_account(&self, caller: &AuthUser) -> Result<(), ApiError> {
        let doc = self
            .store
            .get(collections::USERS, &caller.username)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        let user: User = from_document(doc)?;

        self.store
            .delete(collections::USERS, &caller.username)
            .await?;

        if let Err(e) = self.identity.delete_account(&user.user_id).await {
            warn!(
                username = %caller.username,
                error = %e,
                "profile deleted but identity account removal failed"
            );
        }
        Ok(())
    }
}

fn user_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound { .. } => ApiError::UserNotFound,
        e => e.into(),
    }
}

// =============================================================================
// Tests
// =============================================================================
