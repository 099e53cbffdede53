//! Axum HTTP API server.
//!
//! This crate provides:
//! - Character scene generation backed by the synthesis pipeline
//! - Project and scene storage in Firestore
//! - Firebase ID token verification
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
