//! Identity provider abstraction.
//!
//! The identity layer owns accounts (email + password) and bearer tokens;
//! the application only ever sees the opaque account id (`uid`) that comes
//! back from token verification. [`HmacIdentity`] is the shipped
//! implementation.

mod hmac;

use async_trait::async_trait;

use crate::error::IdentityError;

pub use hmac::HmacIdentity;

/// A freshly created identity account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Stable account id, stored on the user profile as `userId`.
    pub uid: String,

    /// Bearer token for the new account.
    pub token: String,
}

/// Trait for the external authentication service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account; fails with `EmailTaken` on a duplicate email.
    async fn create_account(&self, email: &str, password: &str)
        -> Result<NewAccount, IdentityError>;

    /// Exchange credentials for a bearer token. Unknown email and wrong
    /// password both fail with `InvalidCredentials`.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Verify a bearer token and return the account id it belongs to.
    async fn verify_token(&self, token: &str) -> Result<String, IdentityError>;

    /// Remove an account. Removing an unknown uid is a no-op.
    async fn delete_account(&self, uid: &str) -> Result<(), IdentityError>;
}
