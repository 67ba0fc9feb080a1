//! HMAC-based identity provider.
//!
//! # Token Scheme
//!
//! Tokens are self-contained and expiring:
//!
//! ```text
//! token     = "{uid}.{expiry}.{signature}"
//! signature = hex(HMAC-SHA256(secret_key, "{uid}.{expiry}"))
//! ```
//!
//! Verification checks the expiry first, then compares the signature in
//! constant time. Passwords are stored as hex SHA-256 over a random
//! 16-byte salt concatenated with the password; they never leave this
//! module.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::IdentityError;

use super::{IdentityProvider, NewAccount};

/// HMAC-SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

struct AccountRecord {
    uid: String,
    salt: [u8; 16],
    password_hash: [u8; 32],
}

/// In-process [`IdentityProvider`] backed by HMAC-signed tokens.
pub struct HmacIdentity {
    secret_key: Vec<u8>,
    token_ttl: Duration,
    /// Email to account record.
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl HmacIdentity {
    /// Create a provider with the default token TTL.
    ///
    /// The secret key should be at least 32 bytes.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self::with_token_ttl(secret_key, DEFAULT_TOKEN_TTL)
    }

    pub fn with_token_ttl(secret_key: impl AsRef<[u8]>, token_ttl: Duration) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            token_ttl,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a token for a uid with the configured TTL.
    pub fn issue_token(&self, uid: &str) -> String {
        let expiry = unix_now() + self.token_ttl.as_secs();
        self.issue_token_with_expiry(uid, expiry)
    }

    /// Issue a token with a specific expiry timestamp.
    pub fn issue_token_with_expiry(&self, uid: &str, expiry: u64) -> String {
        let signature = self.compute_signature(uid, expiry);
        format!("{}.{}.{}", uid, expiry, signature)
    }

    fn compute_signature(&self, uid: &str, expiry: u64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(format!("{}.{}", uid, expiry).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn hash_password(salt: &[u8; 16], password: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hasher.finalize().into()
    }
}

#[async_trait]
impl IdentityProvider for HmacIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<NewAccount, IdentityError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(IdentityError::EmailTaken);
        }

        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);

        let uid = Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            AccountRecord {
                uid: uid.clone(),
                salt,
                password_hash: Self::hash_password(&salt, password),
            },
        );
        drop(accounts);

        let token = self.issue_token(&uid);
        Ok(NewAccount { uid, token })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let accounts = self.accounts.read().await;
        // Unknown email and wrong password are indistinguishable to callers
        let record = accounts.get(email).ok_or(IdentityError::InvalidCredentials)?;

        let provided = Self::hash_password(&record.salt, password);
        if provided.ct_eq(&record.password_hash).into() {
            Ok(self.issue_token(&record.uid))
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    async fn verify_token(&self, token: &str) -> Result<String, IdentityError> {
        // "{uid}.{expiry}.{signature}" — uids contain hyphens, not dots
        let mut parts = token.splitn(3, '.');
        let (uid, expiry, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(uid), Some(expiry), Some(signature)) => (uid, expiry, signature),
            _ => return Err(IdentityError::InvalidToken),
        };

        let expiry: u64 = expiry.parse().map_err(|_| IdentityError::InvalidToken)?;

        // Check expiry first
        let current_time = unix_now();
        if current_time > expiry {
            return Err(IdentityError::TokenExpired {
                expired_at: expiry,
                current_time,
            });
        }

        let provided_sig = hex::decode(signature).map_err(|_| IdentityError::InvalidToken)?;
        let expected_sig = hex::decode(self.compute_signature(uid, expiry))
            .map_err(|_| IdentityError::InvalidToken)?;

        // Constant-time comparison
        if provided_sig.ct_eq(&expected_sig).into() {
            Ok(uid.to_string())
        } else {
            Err(IdentityError::InvalidToken)
        }
    }

    async fn delete_account(&self, uid: &str) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().await;
        accounts.retain(|_, record| record.uid != uid);
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Tests
// =============================================================================
