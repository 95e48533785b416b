//! Error types for GuardianAI
//!
//! Three failure classes matter to callers: a malformed request
//! (`Validation`), a failing external service (`Upstream`), and a broken
//! deployment (`Configuration`). Everything else converts into one of them.

use std::fmt;
use thiserror::Error;

/// Pipeline stage that talks to an external dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Embedding,
    Retrieval,
    Reranking,
    Generation,
}

impl Stage {
    /// Stable lowercase name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Embedding => "embedding",
            Stage::Retrieval => "retrieval",
            Stage::Reranking => "reranking",
            Stage::Generation => "generation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the compliance pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Request rejected before any stage ran
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external dependency failed during a stage
    #[error("Upstream error in {stage} stage: {message}")]
    Upstream { stage: Stage, message: String },

    /// Missing credential or endpoint at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller-imposed deadline elapsed before the run completed
    #[error("Operation timed out after {duration_ms}ms")]
    DeadlineExceeded { duration_ms: u64 },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Config file parse errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl PipelineError {
    /// Build an upstream error for `stage` from any displayable cause
    pub fn upstream(stage: Stage, cause: impl fmt::Display) -> Self {
        PipelineError::Upstream {
            stage,
            message: cause.to_string(),
        }
    }

    /// Stage that failed, if this is an upstream failure
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Upstream { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = PipelineError::upstream(Stage::Embedding, "connection refused");
        let text = err.to_string();
        assert!(text.contains("embedding"));
        assert!(text.contains("connection refused"));
        assert_eq!(err.stage(), Some(Stage::Embedding));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Retrieval.as_str(), "retrieval");
        assert_eq!(Stage::Reranking.to_string(), "reranking");
        assert_eq!(Stage::Generation.as_str(), "generation");
    }

    #[test]
    fn test_validation_has_no_stage() {
        let err = PipelineError::Validation("too short".to_string());
        assert!(err.is_validation());
        assert!(err.stage().is_none());
    }
}
