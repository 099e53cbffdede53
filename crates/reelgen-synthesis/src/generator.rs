//! Text generation backend seam.

use async_trait::async_trait;

use crate::error::GenerationError;

/// Produces free text for an instruction prompt.
///
/// Implementations make exactly one backend call per invocation and return
/// errors unmodified; the pipeline never retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
