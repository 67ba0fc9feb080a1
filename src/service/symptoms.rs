//! Symptom CRUD and moderation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, StoreError};
use crate::model::{
    collections, from_document, timestamp, title_case, to_document, AuthUser, Symptom, ADMIN_ROLE,
};
use crate::store::{DocumentStore, Patch, Query, WriteBatch};

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SymptomInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
    #[serde(default)]
    pub critical: bool,
}

/// Owner-editable fields; only non-empty values are applied.
#[derive(Debug, Default, Deserialize)]
pub struct SymptomUpdate {
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

/// Dropdown-friendly projection of a symptom key.
#[derive(Debug, Serialize)]
pub struct SymptomOption {
    pub key: usize,
    pub text: String,
    pub value: String,
}

// =============================================================================
// Service
// =============================================================================

/// Symptom operations: create, read, owner edits, moderation, deletion.
pub struct SymptomService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> SymptomService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a symptom keyed by its title-cased name.
    ///
    /// A caller with role above 0 creates it approved. The document write
    /// and the author's `symptomsMade` increment commit in one batch.
    pub async fn create(&self, caller: &AuthUser, input: SymptomInput) -> Result<String, ApiError> {
        if input.name.trim().is_empty() {
            return Err(ApiError::validation("name", "Please write symptom name."));
        }

        let key = title_case(&input.name);
        if self
            .store
            .get(collections::SYMPTOMS, &key)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyExists {
                field: "name".to_string(),
                message: "This symptom already exists.".to_string(),
            });
        }

        let symptom = Symptom {
            name: key.clone(),
            description: non_empty(input.description),
            specialty: non_empty(input.specialty).map(|s| title_case(&s)),
            other: non_empty(input.other).map(|s| title_case(&s)),
            critical: input.critical,
            approved: caller.role > 0,
            pending_deletion: false,
            created_by: caller.username.clone(),
            created_at: timestamp(),
            last_updated: None,
        };

        let batch = WriteBatch::new()
            .create(collections::SYMPTOMS, &key, to_document(&symptom)?)
            .update(
                collections::USERS,
                &caller.username,
                Patch::new().increment("symptomsMade", 1),
            );
        self.store.commit(batch).await?;

        debug!(symptom = %key, created_by = %caller.username, "symptom created");
        Ok(key)
    }

    pub async fn get(&self, name: &str) -> Result<Symptom, ApiError> {
        let key = title_case(name);
        let doc = self
            .store
            .get(collections::SYMPTOMS, &key)
            .await?
            .ok_or_else(symptom_not_found)?;
        Ok(from_document(doc)?)
    }

    /// All symptom keys as dropdown options, in key order.
    pub async fn list(&self) -> Result<Vec<SymptomOption>, ApiError> {
        let results = self.store.query(collections::SYMPTOMS, Query::new()).await?;
        Ok(results
            .into_iter()
            .enumerate()
            .map(|(key, (name, _))| SymptomOption {
                key,
                text: name.clone(),
                value: name,
            })
            .collect())
    }

    /// Owner-only field edit; stamps `lastUpdated`.
    pub async fn update(
        &self,
        caller: &AuthUser,
        name: &str,
        update: SymptomUpdate,
    ) -> Result<(), ApiError> {
        let key = title_case(name);
        let doc = self
            .store
            .get(collections::SYMPTOMS, &key)
            .await?
            .ok_or_else(symptom_not_found)?;
        let symptom: Symptom = from_document(doc)?;

        if symptom.created_by != caller.username {
            return Err(ApiError::Unauthorized("Unauthorized.".to_string()));
        }

        let mut patch = Patch::new();
        if let Some(specialty) = non_empty(update.specialty) {
            patch = patch.set("specialty", title_case(&specialty));
        }
        if let Some(other) = non_empty(update.other) {
            patch = patch.set("other", title_case(&other));
        }
        patch = patch.set("lastUpdated", timestamp());

        self.store
            .update(collections::SYMPTOMS, &key, patch)
            .await?;
        Ok(())
    }

    /// Admin-only approval; idempotent on an already approved symptom.
    pub async fn approve(&self, caller: &AuthUser, name: &str) -> Result<(), ApiError> {
        if caller.role < ADMIN_ROLE {
            return Err(ApiError::Unauthorized("Unauthorized Access.".to_string()));
        }

        let key = title_case(name);
        self.store
            .update(collections::SYMPTOMS, &key, Patch::new().set("approved", true))
            .await
            .map_err(map_missing)?;
        Ok(())
    }

    /// Self-service deletion request: the acting username must match the
    /// username named in the request body. Marks only; does not delete.
    pub async fn request_deletion(
        &self,
        caller: &AuthUser,
        name: &str,
        requested_by: &str,
    ) -> Result<(), ApiError> {
        if caller.username != requested_by {
            return Err(ApiError::Unauthorized("Unauthorized Access.".to_string()));
        }

        let key = title_case(name);
        self.store
            .update(
                collections::SYMPTOMS,
                &key,
                Patch::new().set("pendingDeletion", true),
            )
            .await
            .map_err(map_missing)?;
        Ok(())
    }

    /// Owner-only deletion. The document delete and the author's counter
    /// decrement commit in one batch; the delete event then drives the
    /// consistency worker's pruning.
    pub async fn delete(&self, caller: &AuthUser, name: &str) -> Result<(), ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "Please enter a valid name."));
        }

        let key = title_case(name);
        let doc = self
            .store
            .get(collections::SYMPTOMS, &key)
            .await?
            .ok_or_else(symptom_not_found)?;
        let symptom: Symptom = from_document(doc)?;

        if symptom.created_by != caller.username {
            return Err(ApiError::Unauthorized("Unauthorized.".to_string()));
        }

        let batch = WriteBatch::new()
            .delete(collections::SYMPTOMS, &key)
            .update(
                collections::USERS,
                &caller.username,
                Patch::new().increment("symptomsMade", -1),
            );
        self.store.commit(batch).await?;

        debug!(symptom = %key, deleted_by = %caller.username, "symptom deleted");
        Ok(())
    }
}

fn symptom_not_found() -> ApiError {
    ApiError::NotFound("Symptom".to_string())
}

fn map_missing(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound { .. } => symptom_not_found(),
        e => e.into(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Tests
// =============================================================================
