//! Admin snapshots and moderation queries.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, StoreError};
use crate::model::{
    collections, from_document, AuthUser, Symptom, User, Virus, ADMIN_ROLE,
};
use crate::store::{DocumentStore, Filter, Patch, Query};

/// Snapshot queries cap at ten rows per panel.
const PANEL_LIMIT: usize = 10;

// =============================================================================
// Response Types
// =============================================================================

/// The admin dashboard snapshot: newest signups, users awaiting their
/// first role, and unapproved content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestSnapshot {
    pub users: Vec<User>,
    pub approve_users: Vec<User>,
    pub viruses: Vec<Virus>,
    pub symptoms: Vec<Symptom>,
}

/// Content whose authors have asked for it to be removed.
#[derive(Debug, Serialize)]
pub struct PendingDeletions {
    pub viruses: Vec<Virus>,
    pub symptoms: Vec<Symptom>,
}

// =============================================================================
// Service
// =============================================================================

/// Read-side dashboards and the role upgrade.
///
/// Snapshots require role 3 exactly; the role upgrade accepts any role at
/// or above it.
pub struct AdminService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> AdminService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Newest users, role-0 users, and unapproved content, ten each.
    pub async fn latest_snapshot(&self, caller: &AuthUser) -> Result<LatestSnapshot, ApiError> {
        require_snapshot_role(caller)?;

        let users = self
            .fetch::<User>(
                collections::USERS,
                Query::new().order_desc("createdAt").limit(PANEL_LIMIT),
            )
            .await?;
        let approve_users = self
            .fetch::<User>(
                collections::USERS,
                Query::new()
                    .filter(Filter::eq("role", 0))
                    .order_desc("createdAt")
                    .limit(PANEL_LIMIT),
            )
            .await?;
        let viruses = self
            .fetch::<Virus>(collections::VIRUSES, unapproved_query())
            .await?;
        let symptoms = self
            .fetch::<Symptom>(collections::SYMPTOMS, unapproved_query())
            .await?;

        Ok(LatestSnapshot {
            users,
            approve_users,
            viruses,
            symptoms,
        })
    }

    /// Content marked `pendingDeletion`, ten of each kind.
    pub async fn pending_deletions(&self, caller: &AuthUser) -> Result<PendingDeletions, ApiError> {
        require_snapshot_role(caller)?;

        let viruses = self
            .fetch::<Virus>(collections::VIRUSES, pending_query())
            .await?;
        let symptoms = self
            .fetch::<Symptom>(collections::SYMPTOMS, pending_query())
            .await?;

        Ok(PendingDeletions { viruses, symptoms })
    }

    /// Raise a user's role by one.
    pub async fn upgrade_role(&self, caller: &AuthUser, username: &str) -> Result<(), ApiError> {
        if caller.role < ADMIN_ROLE {
            return Err(ApiError::Unauthorized("Unauthorized Access.".to_string()));
        }

        self.store
            .update(
                collections::USERS,
                username,
                Patch::new().increment("role", 1),
            )
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ApiError::NotFound("User".to_string()),
                e => e.into(),
            })?;

        info!(username, upgraded_by = %caller.username, "role upgraded");
        Ok(())
    }

    async fn fetch<T: for<'de> serde::Deserialize<'de>>(
        &self,
        collection: &str,
        query: Query,
    ) -> Result<Vec<T>, ApiError> {
        let results = self.store.query(collection, query).await?;
        Ok(results
            .into_iter()
            .map(|(_, doc)| from_document(doc))
            .collect::<Result<Vec<T>, _>>()?)
    }
}

fn require_snapshot_role(caller: &AuthUser) -> Result<(), ApiError> {
    // Exactly the admin role: the dashboards do not open up further
    if caller.role != ADMIN_ROLE {
        return Err(ApiError::Unauthorized("Forbidden Access".to_string()));
    }
    Ok(())
}

fn unapproved_query() -> Query {
    Query::new()
        .filter(Filter::eq("approved", false))
        .order_desc("createdAt")
        .limit(PANEL_LIMIT)
}

fn pending_query() -> Query {
    Query::new()
        .filter(Filter::eq("pendingDeletion", true))
        .order_desc("createdAt")
        .limit(PANEL_LIMIT)
}

// =============================================================================
// Tests
// =============================================================================
