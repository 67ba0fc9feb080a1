//! Virus CRUD and moderation.
//!
//! A virus references symptoms by key. Every reference is checked against
//! the symptoms collection at write time, both on create and when an
//! update replaces the symptom list; pruning after a symptom deletion is
//! the consistency worker's job.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, StoreError};
use crate::model::{
    collections, from_document, timestamp, title_case, to_document, AuthUser, Virus, ADMIN_ROLE,
};
use crate::store::{DocumentStore, Patch, Query, WriteBatch};

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VirusInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

/// Owner-editable fields; only provided values are applied. A provided
/// symptom list replaces the stored one and is validated in full.
#[derive(Debug, Default, Deserialize)]
pub struct VirusUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
}

/// List projection: enough to render a card without the full document.
#[derive(Debug, Serialize)]
pub struct VirusSummary {
    pub name: String,
    pub symptoms: Vec<String>,
    pub critical: bool,
}

// =============================================================================
// Service
// =============================================================================

/// Virus operations: create, read, owner edits, moderation, deletion.
pub struct VirusService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> VirusService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a virus keyed by its title-cased name.
    ///
    /// The symptom list is title-cased, deduplicated keeping first
    /// occurrences, and every key must exist; otherwise nothing is written
    /// and the missing keys are reported. The document write and the
    /// author's `virusesMade` increment commit in one batch.
    pub async fn create(&self, caller: &AuthUser, input: VirusInput) -> Result<String, ApiError> {
        if input.name.trim().is_empty() {
            return Err(ApiError::validation("name", "Please write virus name."));
        }
        if input.symptoms.iter().all(|s| s.trim().is_empty()) {
            return Err(ApiError::validation(
                "symptoms",
                "Please add symptoms of the virus.",
            ));
        }

        let key = title_case(&input.name);
        if self.store.get(collections::VIRUSES, &key).await?.is_some() {
            return Err(ApiError::AlreadyExists {
                field: "name".to_string(),
                message: "This virus already exists.".to_string(),
            });
        }

        let symptoms = self.resolve_symptoms(&input.symptoms).await?;

        let virus = Virus {
            name: key.clone(),
            description: non_empty(input.description),
            kind: non_empty(input.kind).map(|s| title_case(&s)),
            duration: non_empty(input.duration),
            specialty: non_empty(input.specialty).map(|s| title_case(&s)),
            other: non_empty(input.other).map(|s| title_case(&s)),
            critical: input.critical,
            symptoms,
            approved: caller.role > 0,
            pending_deletion: false,
            created_by: caller.username.clone(),
            created_at: timestamp(),
            last_updated: None,
        };

        let batch = WriteBatch::new()
            .create(collections::VIRUSES, &key, to_document(&virus)?)
            .update(
                collections::USERS,
                &caller.username,
                Patch::new().increment("virusesMade", 1),
            );
        self.store.commit(batch).await?;

        debug!(virus = %key, created_by = %caller.username, "virus created");
        Ok(key)
    }

    pub async fn get(&self, name: &str) -> Result<Virus, ApiError> {
        let key = title_case(name);
        let doc = self
            .store
            .get(collections::VIRUSES, &key)
            .await?
            .ok_or_else(virus_not_found)?;
        Ok(from_document(doc)?)
    }

    /// All viruses as list summaries, in key order.
    pub async fn list(&self) -> Result<Vec<VirusSummary>, ApiError> {
        let results = self.store.query(collections::VIRUSES, Query::new()).await?;
        results
            .into_iter()
            .map(|(_, doc)| {
                let virus: Virus = from_document(doc)?;
                Ok(VirusSummary {
                    name: virus.name,
                    symptoms: virus.symptoms,
                    critical: virus.critical,
                })
            })
            .collect()
    }

    /// Owner-only field edit; stamps `lastUpdated`. A provided symptom
    /// list must resolve in full or the update is rejected whole.
    pub async fn update(
        &self,
        caller: &AuthUser,
        name: &str,
        update: VirusUpdate,
    ) -> Result<(), ApiError> {
        let key = title_case(name);
        let doc = self
            .store
            .get(collections::VIRUSES, &key)
            .await?
            .ok_or_else(virus_not_found)?;
        let virus: Virus = from_document(doc)?;

        if virus.created_by != caller.username {
            return Err(ApiError::Unauthorized("Unauthorized.".to_string()));
        }

        let mut patch = Patch::new();
        if let Some(description) = non_empty(update.description) {
            patch = patch.set("description", description);
        }
        if let Some(kind) = non_empty(update.kind) {
            patch = patch.set("type", title_case(&kind));
        }
        if let Some(duration) = non_empty(update.duration) {
            patch = patch.set("duration", duration);
        }
        if let Some(specialty) = non_empty(update.specialty) {
            patch = patch.set("specialty", title_case(&specialty));
        }
        if let Some(other) = non_empty(update.other) {
            patch = patch.set("other", title_case(&other));
        }
        if let Some(symptoms) = update.symptoms {
            let resolved = self.resolve_symptoms(&symptoms).await?;
            patch = patch.set("symptoms", resolved);
        }
        patch = patch.set("lastUpdated", timestamp());

        self.store.update(collections::VIRUSES, &key, patch).await?;
        Ok(())
    }

    /// Admin-only approval; idempotent on an already approved virus.
    pub async fn approve(&self, caller: &AuthUser, name: &str) -> Result<(), ApiError> {
        if caller.role < ADMIN_ROLE {
            return Err(ApiError::Unauthorized("Unauthorized Access.".to_string()));
        }

        let key = title_case(name);
        self.store
            .update(collections::VIRUSES, &key, Patch::new().set("approved", true))
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
                collections::VIRUSES,
                &key,
                Patch::new().set("pendingDeletion", true),
            )
            .await
            .map_err(map_missing)?;
        Ok(())
    }

    /// Owner-only deletion. The document delete and the author's counter
    /// decrement commit in one batch.
    pub async fn delete(&self, caller: &AuthUser, name: &str) -> Result<(), ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "Please enter a valid name."));
        }

        let key = title_case(name);
        let doc = self
            .store
            .get(collections::VIRUSES, &key)
            .await?
            .ok_or_else(virus_not_found)?;
        let virus: Virus = from_document(doc)?;

        if virus.created_by != caller.username {
            return Err(ApiError::Unauthorized("Unauthorized.".to_string()));
        }

        let batch = WriteBatch::new()
            .delete(collections::VIRUSES, &key)
            .update(
                collections::USERS,
                &caller.username,
                Patch::new().increment("virusesMade", -1),
            );
        self.store.commit(batch).await?;

        debug!(virus = %key, deleted_by = %caller.username, "virus deleted");
        Ok(())
    }

    /// Title-case, dedup (first occurrence wins), and verify every symptom
    /// key exists. All-or-nothing: a single missing key fails the whole
    /// list.
    async fn resolve_symptoms(&self, symptoms: &[String]) -> Result<Vec<String>, ApiError> {
        let mut resolved: Vec<String> = Vec::with_capacity(symptoms.len());
        for symptom in symptoms {
            if symptom.trim().is_empty() {
                continue;
            }
            let key = title_case(symptom);
            if !resolved.contains(&key) {
                resolved.push(key);
            }
        }

        let mut missing = Vec::new();
        for key in &resolved {
            if self.store.get(collections::SYMPTOMS, key).await?.is_none() {
                missing.push(key.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ApiError::InvalidReference {
                message: "Symptoms do not match the existing ones.".to_string(),
                missing,
            });
        }

        Ok(resolved)
    }
}

fn virus_not_found() -> ApiError {
    ApiError::NotFound("Virus".to_string())
}

fn map_missing(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound { .. } => virus_not_found(),
        e => e.into(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Tests
// =============================================================================
