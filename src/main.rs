//! BioFlash API - quiz and catalogue backend for viruses and symptoms.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bioflash_api::{
    config::Config,
    consistency::ConsistencyWorker,
    identity::{HmacIdentity, IdentityProvider},
    model::{collections, to_document, User},
    server::{create_router, AppState, RouterConfig},
    store::{DocumentStore, MemoryStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(HmacIdentity::with_token_ttl(
        config.identity_secret.as_deref().unwrap_or_default(),
        Duration::from_secs(config.token_ttl_secs),
    ));

    // The worker holds its own subscription; spawn before any request can
    // delete a document so no event is missed.
    let worker = ConsistencyWorker::new(Arc::clone(&store));
    tokio::spawn(worker.run());

    if let Some((email, password, username)) = config.admin_seed() {
        if let Err(e) = seed_admin(&*store, &*identity, email, password, username).await {
            error!("Failed to seed admin account: {}", e);
            return ExitCode::FAILURE;
        }
        info!(username, "admin account seeded");
    }

    let state = AppState::new(store, identity);
    let router_config = build_router_config(&config);
    let router = create_router(state, router_config);

    let addr = config.bind_address();
    info!("Server listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Create the admin identity account and its role-3 profile.
///
/// Startup runs once against an empty store, so a taken email or username
/// is a configuration error rather than a race.
async fn seed_admin(
    store: &impl DocumentStore,
    identity: &impl IdentityProvider,
    email: &str,
    password: &str,
    username: &str,
) -> Result<(), String> {
    let account = identity
        .create_account(email, password)
        .await
        .map_err(|e| e.to_string())?;

    let mut user = User::new(username.to_string(), email.to_string(), account.uid);
    user.role = 3;

    let doc = to_document(&user).map_err(|e| e.to_string())?;
    store
        .create(collections::USERS, username, doc)
        .await
        .map_err(|e| e.to_string())
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bioflash_api=debug,tower_http=debug"
    } else {
        "bioflash_api=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
