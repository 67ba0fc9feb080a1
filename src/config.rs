//! Configuration management for the BioFlash API.
//!
//! Supports command-line arguments via clap, environment variables with a
//! `BIOFLASH_` prefix, and defaults for everything optional.
//!
//! # Environment Variables
//!
//! - `BIOFLASH_HOST` - Server bind address (default: 0.0.0.0)
//! - `BIOFLASH_PORT` - Server port (default: 3000)
//! - `BIOFLASH_IDENTITY_SECRET` - HMAC secret for bearer tokens (required)
//! - `BIOFLASH_TOKEN_TTL` - Token lifetime in seconds (default: 86400)
//! - `BIOFLASH_CORS_ORIGINS` - Allowed CORS origins, comma-separated
//! - `BIOFLASH_ADMIN_EMAIL` - Seed admin account email
//! - `BIOFLASH_ADMIN_PASSWORD` - Seed admin account password
//! - `BIOFLASH_ADMIN_USERNAME` - Seed admin account username

use clap::Parser;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bearer token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// BioFlash API - quiz and catalogue backend for viruses and symptoms.
#[derive(Parser, Debug, Clone)]
#[command(name = "bioflash-api")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BIOFLASH_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "BIOFLASH_PORT")]
    pub port: u16,

    // =========================================================================
    // Identity Configuration
    // =========================================================================
    /// Secret key for HMAC-SHA256 bearer tokens.
    ///
    /// If not provided, the server will fail to start.
    #[arg(long, env = "BIOFLASH_IDENTITY_SECRET")]
    pub identity_secret: Option<String>,

    /// Bearer token lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS, env = "BIOFLASH_TOKEN_TTL")]
    pub token_ttl_secs: u64,

    // =========================================================================
    // Admin Seed Account
    // =========================================================================
    /// Email for the seeded admin account.
    ///
    /// When all three admin options are set, an admin (role 3) account is
    /// created at startup.
    #[arg(long, env = "BIOFLASH_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Password for the seeded admin account.
    #[arg(long, env = "BIOFLASH_ADMIN_PASSWORD")]
    pub admin_password: Option<String>,

    /// Username for the seeded admin account.
    #[arg(long, env = "BIOFLASH_ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "BIOFLASH_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match &self.identity_secret {
            None => {
                return Err(
                    "No identity secret provided. Set --identity-secret or BIOFLASH_IDENTITY_SECRET"
                        .to_string(),
                )
            }
            Some(secret) if secret.len() < 16 => {
                return Err("identity_secret must be at least 16 characters".to_string())
            }
            Some(_) => {}
        }

        if self.token_ttl_secs == 0 {
            return Err("token_ttl must be greater than 0".to_string());
        }

        // The admin seed is all-or-nothing
        let admin_parts = [
            self.admin_email.is_some(),
            self.admin_password.is_some(),
            self.admin_username.is_some(),
        ];
        if admin_parts.iter().any(|set| *set) && !admin_parts.iter().all(|set| *set) {
            return Err(
                "Admin seed requires all of --admin-email, --admin-password and --admin-username"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The admin seed triple, if fully configured.
    pub fn admin_seed(&self) -> Option<(&str, &str, &str)> {
        match (&self.admin_email, &self.admin_password, &self.admin_username) {
            (Some(email), Some(password), Some(username)) => {
                Some((email.as_str(), password.as_str(), username.as_str()))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
