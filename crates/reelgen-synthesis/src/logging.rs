//! Structured synthesis logging utilities.
//!
//! Provides consistent, structured logging for synthesis runs with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

/// Logger for one synthesis request.
///
/// Every event carries the request id and the operation name.
#[derive(Debug, Clone)]
pub struct SynthesisLogger {
    request_id: String,
    operation: String,
}

impl SynthesisLogger {
    /// Create a logger for a request and operation (e.g. "educational_scenes").
    pub fn new(request_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            operation: operation.into(),
        }
    }

    /// Create a logger with a fresh request id.
    pub fn generate(operation: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), operation)
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Synthesis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Synthesis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Synthesis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Synthesis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Synthesis completed: {}", message
        );
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this request.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "synthesis",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = SynthesisLogger::new("req-123", "food_scenes");
        assert_eq!(logger.request_id(), "req-123");
        assert_eq!(logger.operation(), "food_scenes");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SynthesisLogger::generate("educational_scenes");
        let b = SynthesisLogger::generate("educational_scenes");
        assert_ne!(a.request_id(), b.request_id());
        assert_eq!(a.request_id().len(), 36);
    }
}
