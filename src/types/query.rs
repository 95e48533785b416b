//! Compliance query (request) type

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};

/// Minimum query length, counted in characters
pub const MIN_QUERY_CHARS: usize = 10;

/// User id applied when the request omits one
pub const DEFAULT_USER_ID: &str = "default_user";

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// A free-text compliance question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceQuery {
    pub text: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl ComplianceQuery {
    /// Build a validated query
    pub fn new(text: impl Into<String>, user_id: Option<String>) -> Result<Self> {
        let query = Self {
            text: text.into(),
            user_id: user_id.unwrap_or_else(default_user_id),
        };
        query.validate()?;
        Ok(query)
    }

    /// Check the length constraint
    ///
    /// Deserialized queries bypass [`ComplianceQuery::new`], so the pipeline
    /// calls this again before doing any work.
    pub fn validate(&self) -> Result<()> {
        let chars = self.text.chars().count();
        if chars < MIN_QUERY_CHARS {
            return Err(PipelineError::Validation(format!(
                "query text must be at least {} characters, got {}",
                MIN_QUERY_CHARS, chars
            )));
        }
        Ok(())
    }
}
