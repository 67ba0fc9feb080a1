//! HTTP server layer for the BioFlash API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          HTTP Layer                              │
//! │     POST /symptom   GET /virus/{name}   GET /admin   ...         │
//! │                                                                  │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌─────────────────────┐  │
//! │  │  handlers   │  │      auth        │  │       routes        │  │
//! │  │ (requests)  │  │ (bearer gate)    │  │  (router config)    │  │
//! │  └─────────────┘  └──────────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use handlers::{health_handler, AppState, HealthResponse};
pub use routes::{create_router, RouterConfig};
