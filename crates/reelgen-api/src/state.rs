//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use reelgen_firestore::{FirestoreClient, ProjectRepository};
use reelgen_synthesis::{GeminiClient, PipelineConfig, ScenePipeline, VoiceCatalog};

use crate::auth::{AuthUser, JwksCache};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::IpRateLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: ScenePipeline,
    /// `None` when Firestore is not configured; generation still works
    pub firestore: Option<FirestoreClient>,
    pub jwks: Arc<JwksCache>,
    pub rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        pipeline: ScenePipeline,
        firestore: Option<FirestoreClient>,
        jwks: JwksCache,
    ) -> Self {
        let rate_limiter = IpRateLimiter::new(config.rate_limit_rps, config.rate_limit_burst);
        Self {
            config,
            pipeline,
            firestore,
            jwks: Arc::new(jwks),
            rate_limiter,
        }
    }

    /// Build state from the environment.
    ///
    /// The Gemini key is required. Firestore is optional: without it the
    /// API generates scenes but reports them as unsaved.
    pub async fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let generator = GeminiClient::from_env()?;
        info!(model = %generator.model(), "Gemini client ready");

        let pipeline = ScenePipeline::new(
            PipelineConfig::from_env(),
            Arc::new(VoiceCatalog::builtin()),
            Arc::new(generator),
        );

        let firestore = match FirestoreClient::from_env().await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Firestore unavailable, projects will not be saved");
                None
            }
        };

        let jwks = JwksCache::new(config.firebase_project_id.clone(), config.jwks_url.clone())?;
        if config.firebase_project_id.is_empty() {
            warn!("FIREBASE_PROJECT_ID not set, all authenticated routes will reject requests");
        } else if let Err(e) = jwks.refresh_keys().await {
            warn!(error = %e, "Initial JWKS fetch failed, will retry on first request");
        }

        Ok(Self::new(config, pipeline, firestore, jwks))
    }

    /// Project repository scoped to the caller, or 503 without Firestore.
    pub fn projects(&self, user: &AuthUser) -> ApiResult<ProjectRepository> {
        self.firestore
            .clone()
            .map(|client| ProjectRepository::new(client, user.uid.clone()))
            .ok_or_else(|| ApiError::Unavailable("Project storage is not configured".into()))
    }
}
