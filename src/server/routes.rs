//! Router configuration for the BioFlash API.
//!
//! # Route Structure
//!
//! ```text
//! /health                        - Health check (public)
//! /signup, /login                - Account creation and sign-in (public)
//! /symptoms, /symptom/{name}     - Symptom reads (public) and writes (bearer)
//! /viruses, /virus/{name}        - Virus reads (public) and writes (bearer)
//! /user, /user/{username}        - Profile endpoints
//! /results                       - Quiz leaderboard (public) and uploads (bearer)
//! /admin/...                     - Moderation dashboards (bearer, role-gated)
//! ```
//!
//! Protected handlers authenticate through the `AuthUser` extractor, so
//! the router itself carries no auth middleware; CORS and tracing are the
//! only layers.
//!
//! # Example
//!
//! ```ignore
//! use bioflash_api::server::{create_router, AppState, RouterConfig};
//!
//! let state = AppState::new(store, identity);
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//! let router = create_router(state, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::identity::IdentityProvider;
use crate::store::DocumentStore;

use super::handlers::{admin, health_handler, quiz, symptoms, users, viruses, AppState};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Default configuration: any CORS origin, tracing enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
pub fn create_router<S, I>(state: AppState<S, I>, config: RouterConfig) -> Router
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        // Accounts and profiles
        .route("/signup", post(users::signup::<S, I>))
        .route("/login", post(users::login::<S, I>))
        .route(
            "/user",
            get(users::authenticated_user::<S, I>)
                .post(users::add_details::<S, I>)
                .delete(users::delete_account::<S, I>),
        )
        .route("/user/{username}", get(users::user_details::<S, I>))
        .route("/users/top", get(users::top_users::<S, I>))
        // Symptoms
        .route("/symptoms", get(symptoms::list::<S, I>))
        .route("/symptom", post(symptoms::create::<S, I>))
        .route(
            "/symptom/{name}",
            get(symptoms::get::<S, I>)
                .post(symptoms::update::<S, I>)
                .delete(symptoms::delete::<S, I>),
        )
        .route(
            "/delete/symptom/{name}",
            put(symptoms::request_deletion::<S, I>),
        )
        // Viruses
        .route("/viruses", get(viruses::list::<S, I>))
        .route("/virus", post(viruses::create::<S, I>))
        .route(
            "/virus/{name}",
            get(viruses::get::<S, I>)
                .post(viruses::update::<S, I>)
                .delete(viruses::delete::<S, I>),
        )
        .route(
            "/delete/virus/{name}",
            put(viruses::request_deletion::<S, I>),
        )
        // Quiz
        .route(
            "/results",
            get(quiz::leaderboard::<S, I>).post(quiz::upload::<S, I>),
        )
        .route("/results/user", get(quiz::user_results::<S, I>))
        // Admin
        .route("/admin", get(admin::latest_snapshot::<S, I>))
        .route("/admin/data/delete", get(admin::pending_deletions::<S, I>))
        .route("/admin/user/{username}", put(admin::upgrade_role::<S, I>))
        .route("/admin/symptom/{name}", put(symptoms::approve::<S, I>))
        .route("/admin/virus/{name}", put(viruses::approve::<S, I>))
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
