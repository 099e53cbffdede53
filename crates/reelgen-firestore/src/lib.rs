//! Firestore REST API client.
//!
//! This crate provides:
//! - Character project and scene repositories
//! - Service account authentication via gcp_auth with token caching
//! - Atomic batch writes and retry with backoff

pub mod client;
pub mod error;
pub mod metrics;
pub mod project_repo;
pub mod retry;
pub mod scene_repo;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use project_repo::ProjectRepository;
pub use retry::RetryConfig;
pub use scene_repo::SceneRepository;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
