//! Data model for the BioFlash API.
//!
//! Documents are stored as JSON objects with camelCase field names; the
//! structs here are the typed views the services work with. Symptom and
//! virus documents are keyed by their title-cased name, user documents by
//! username, quiz results by a generated id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A stored document: a JSON object addressed by collection and key.
pub type Document = Map<String, Value>;

// =============================================================================
// Collections
// =============================================================================

/// Collection names used by the services and the consistency worker.
pub mod collections {
    /// User profiles, keyed by username.
    pub const USERS: &str = "users";

    /// Symptoms, keyed by title-cased name.
    pub const SYMPTOMS: &str = "symptoms";

    /// Viruses, keyed by title-cased name.
    pub const VIRUSES: &str = "viruses";

    /// Quiz results, keyed by generated id. Append-only.
    pub const QUIZ: &str = "quiz";
}

/// Minimum role required for moderation actions (approve, role upgrade).
pub const ADMIN_ROLE: i64 = 3;

// =============================================================================
// Entities
// =============================================================================

/// A user profile document.
///
/// `username` doubles as the document key and is immutable once set.
/// The counters are mutated only by the entity services, in the same batch
/// as the content write they account for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: String,

    /// Identity-provider account id; the join key used by the auth gate.
    pub user_id: String,

    /// Trust level: 0 unverified, 1 verified, >=3 admin.
    pub role: i64,

    /// RFC 3339 UTC timestamp with millisecond precision.
    pub created_at: String,

    pub symptoms_made: i64,
    pub viruses_made: i64,
    pub quiz_answered: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl User {
    /// A fresh role-0 profile with zeroed counters.
    pub fn new(username: String, email: String, user_id: String) -> Self {
        Self {
            username,
            email,
            user_id,
            role: 0,
            created_at: timestamp(),
            symptoms_made: 0,
            viruses_made: 0,
            quiz_answered: 0,
            first_name: None,
            last_name: None,
            about: None,
            location: None,
            gender: None,
        }
    }
}

/// A symptom document, keyed by its title-cased name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    /// Equal to the document key.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,

    #[serde(default)]
    pub critical: bool,
    pub approved: bool,
    pub pending_deletion: bool,

    /// Weak reference to the authoring user's key; integrity is maintained
    /// by the consistency worker, not by the store.
    pub created_by: String,
    pub created_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A virus document, keyed by its title-cased name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Virus {
    /// Equal to the document key.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,

    #[serde(default)]
    pub critical: bool,

    /// Symptom keys, in request order with duplicates dropped. Every entry
    /// existed in the symptoms collection when this document was written.
    pub symptoms: Vec<String>,

    pub approved: bool,
    pub pending_deletion: bool,

    pub created_by: String,
    pub created_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// An append-only quiz result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub answered_by: String,
    pub answered_at: String,
    pub answers: Vec<Value>,
    pub correct_answers: i64,
    pub wrong_answers: i64,
}

/// The authenticated caller, produced by the authorization gate.
///
/// This is the only channel through which a service learns who is calling.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: i64,
}

// =============================================================================
// Helpers
// =============================================================================

/// Current time as RFC 3339 UTC with millisecond precision.
///
/// Fixed precision keeps string ordering equal to chronological ordering,
/// which the store's order-by relies on.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Title-case a name: trim, lowercase, then uppercase the first character
/// of each space-separated word.
///
/// Idempotent, so route parameters that arrive already title-cased
/// normalize to themselves.
pub fn title_case(phrase: &str) -> String {
    phrase
        .trim()
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Minimal email shape check: one `@` with a dot somewhere after it.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Usernames: 3-16 characters from `[A-Za-z0-9_]`.
pub fn is_valid_username(username: &str) -> bool {
    (3..=16).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Serialize an entity into a stored document.
pub fn to_document<T: Serialize>(entity: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Malformed(
            "entity did not serialize to an object".to_string(),
        )),
        Err(e) => Err(StoreError::Malformed(e.to_string())),
    }
}

/// Deserialize a stored document into a typed entity.
pub fn from_document<T: for<'de> Deserialize<'de>>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Malformed(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
