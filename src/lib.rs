//! # BioFlash API
//!
//! A REST backend for a quiz application about viruses and their symptoms.
//!
//! Users sign up, author symptoms and viruses, answer quizzes, and
//! moderators approve content and promote users. Symptom and virus
//! documents reference each other by key; a consistency worker keeps
//! those references and the per-user counters coherent after deletions.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`store`] - Collection/key document storage with queries, batches,
//!   and delete events
//! - [`identity`] - Account credentials and HMAC-signed bearer tokens
//! - [`service`] - Per-collection business rules (validation, ownership,
//!   roles)
//! - [`consistency`] - Background worker reacting to deletions (cascade
//!   and reference pruning)
//! - [`server`] - Axum-based HTTP server, auth gate, and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bioflash_api::consistency::ConsistencyWorker;
//! use bioflash_api::identity::HmacIdentity;
//! use bioflash_api::server::{create_router, AppState, RouterConfig};
//! use bioflash_api::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let identity = Arc::new(HmacIdentity::new("a-long-enough-secret"));
//!
//!     tokio::spawn(ConsistencyWorker::new(Arc::clone(&store)).run());
//!
//!     let state = AppState::new(store, identity);
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod consistency;
pub mod error;
pub mod identity;
pub mod model;
pub mod server;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use consistency::ConsistencyWorker;
pub use error::{ApiError, FieldErrors, IdentityError, StoreError};
pub use identity::{HmacIdentity, IdentityProvider, NewAccount};
pub use model::{AuthUser, Document, QuizResult, Symptom, User, Virus};
pub use server::{create_router, health_handler, AppState, HealthResponse, RouterConfig};
pub use service::{
    AdminService, LatestSnapshot, LoginRequest, PendingDeletions, QuizService, ResultsUpload,
    SignupRequest, SymptomInput, SymptomOption, SymptomService, SymptomUpdate, UserDetails,
    UserProfile, UserService, VirusInput, VirusService, VirusSummary, VirusUpdate,
};
pub use store::{
    DeleteEvent, DocumentStore, Filter, MemoryStore, Order, Patch, PatchOp, Query, WriteBatch,
    WriteOp,
};
