//! Synthesis error types.

use thiserror::Error;

pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Failures of the external text generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation backend returned {0}: {1}")]
    Status(u16, String),

    #[error("Generation backend rate limited the request")]
    RateLimited,

    #[error("Generation backend returned an empty response")]
    EmptyResponse,

    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed generation response: {0}")]
    Malformed(String),

    #[error("Generation configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-success HTTP status from the backend.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            429 => Self::RateLimited,
            _ => Self::Status(status, body.into()),
        }
    }

    /// Whether a caller-level retry could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Request(_)
            | GenerationError::RateLimited
            | GenerationError::Timeout(_)
            | GenerationError::EmptyResponse => true,
            GenerationError::Status(code, _) => *code >= 500,
            GenerationError::Malformed(_) | GenerationError::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Request(format!("timed out: {}", e))
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Caller-visible synthesis failures.
///
/// Per-slot parse problems are not errors; they are repaired and reported
/// through [`reelgen_models::ParseReport`].
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Response contained no scene delimiters: {0}")]
    ParseFatal(String),
}

impl SynthesisError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn parse_fatal(msg: impl Into<String>) -> Self {
        Self::ParseFatal(msg.into())
    }

    /// Short machine-readable code for API responses and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            SynthesisError::Input(_) => "invalid_input",
            SynthesisError::Generation(GenerationError::RateLimited) => "generation_rate_limited",
            SynthesisError::Generation(GenerationError::Timeout(_)) => "generation_timeout",
            SynthesisError::Generation(_) => "generation_failed",
            SynthesisError::ParseFatal(_) => "unparseable_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            GenerationError::from_status(429, "quota"),
            GenerationError::RateLimited
        ));
        assert!(matches!(
            GenerationError::from_status(503, "down"),
            GenerationError::Status(503, _)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(GenerationError::Status(502, String::new()).is_retryable());
        assert!(!GenerationError::Status(400, String::new()).is_retryable());
        assert!(!GenerationError::config("missing key").is_retryable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SynthesisError::input("x").code(), "invalid_input");
        assert_eq!(
            SynthesisError::from(GenerationError::Timeout(5)).code(),
            "generation_timeout"
        );
        assert_eq!(SynthesisError::parse_fatal("x").code(), "unparseable_response");
    }
}
