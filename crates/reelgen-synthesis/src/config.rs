//! Synthesis configuration.

use std::time::Duration;

use crate::error::GenerationError;

/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model name (single model, no fallback chain)
    pub model: String,
    /// API base URL, overridable for tests and proxies
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Create a config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: 0.7,
            max_output_tokens: 8192,
            timeout: Duration::from_secs(60),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GenerationError::config("GEMINI_API_KEY not set"))?;
        if api_key.trim().is_empty() {
            return Err(GenerationError::config("GEMINI_API_KEY cannot be empty"));
        }

        let defaults = Self::new(api_key);
        Ok(Self {
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model.clone()),
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url.clone()),
            temperature: std::env::var("GEMINI_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
            max_output_tokens: std::env::var("GEMINI_MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_output_tokens),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            ..defaults
        })
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seconds of requested duration per planned scene
    pub planning_unit_secs: u32,
    /// Rendered length of each scene
    pub scene_duration_secs: u32,
    /// Upper bound on the generation call
    pub generation_timeout: Duration,
    /// Largest accepted total duration
    pub max_total_duration_secs: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            planning_unit_secs: 8,
            scene_duration_secs: 7,
            generation_timeout: Duration::from_secs(90),
            max_total_duration_secs: 600,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            planning_unit_secs: std::env::var("SCENE_PLANNING_UNIT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            scene_duration_secs: std::env::var("SCENE_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            generation_timeout: Duration::from_secs(
                std::env::var("GENERATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(90),
            ),
            max_total_duration_secs: std::env::var("MAX_TOTAL_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_gemini_config_requires_key() {
        std::env::remove_var("GEMINI_API_KEY");
        assert!(matches!(
            GeminiConfig::from_env(),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_gemini_config_defaults() {
        std::env::set_var("GEMINI_API_KEY", "test-key");
        std::env::remove_var("GEMINI_MODEL");
        std::env::remove_var("GEMINI_BASE_URL");
        std::env::remove_var("GEMINI_TEMPERATURE");

        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.max_output_tokens, 8192);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);

        std::env::remove_var("GEMINI_API_KEY");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = GeminiConfig::new("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    #[serial]
    fn test_pipeline_config_defaults() {
        std::env::remove_var("SCENE_PLANNING_UNIT_SECS");
        std::env::remove_var("SCENE_DURATION_SECS");
        let config = PipelineConfig::from_env();
        assert_eq!(config.planning_unit_secs, 8);
        assert_eq!(config.scene_duration_secs, 7);
    }
}
