use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to human-readable message, reported for validation failures.
pub type FieldErrors = BTreeMap<String, String>;

/// Errors surfaced by a document store implementation
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No document exists at the addressed key
    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    /// A document already exists at the addressed key
    #[error("Document already exists: {collection}/{key}")]
    AlreadyExists { collection: String, key: String },

    /// A patch could not be applied to the document's current contents
    #[error("Invalid patch on {collection}/{key}: {message}")]
    InvalidPatch {
        collection: String,
        key: String,
        message: String,
    },

    /// A stored document does not deserialize into the expected shape
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// The store backend is unreachable or misbehaving
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by an identity provider implementation
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// An account with this email already exists
    #[error("Email is already in use")]
    EmailTaken,

    /// Unknown email or wrong password; indistinguishable to callers
    #[error("Wrong credentials")]
    InvalidCredentials,

    /// Token is malformed or its signature does not verify
    #[error("Invalid token")]
    InvalidToken,

    /// Token is well-formed but past its expiry
    #[error("Token expired at {expired_at} (current time: {current_time})")]
    TokenExpired { expired_at: u64, current_time: u64 },

    /// The identity backend is unreachable or misbehaving
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Application-level error taxonomy.
///
/// Every failure a handler can produce is one of these variants; the server
/// layer maps each to an HTTP status and a structured JSON body. Store and
/// identity errors convert through the `#[from]` impls so services can use
/// `?` at the collaborator seams.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Malformed or missing input, reported per field
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Missing or unverifiable bearer token
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated caller lacks the role or ownership the operation requires
    #[error("{0}")]
    Unauthorized(String),

    /// Token verified but no user profile matches the identity
    #[error("User profile not found for the authenticated identity.")]
    UserNotFound,

    /// The addressed entity does not exist
    #[error("{0} not found.")]
    NotFound(String),

    /// Creation targeted a key that is already taken; `field` names the
    /// offending input in the response body
    #[error("{message}")]
    AlreadyExists { field: String, message: String },

    /// Supplied references that do not resolve to existing documents
    #[error("{message}")]
    InvalidReference {
        message: String,
        missing: Vec<String>,
    },

    /// Document store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider failure
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

impl ApiError {
    /// Validation failure on a single field.
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.to_string());
        ApiError::Validation(errors)
    }
}
