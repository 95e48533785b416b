//! Compliance report (response) types

use serde::{Deserialize, Serialize};

use crate::types::chunk::Chunk;

/// Article label used when a chunk carries no `article_number`
pub const MISSING_ARTICLE: &str = "N/A";

/// Token accounting for one generation call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Citation for one context chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub source_document: String,
    pub article_number: String,
    pub content_chunk: String,
}

impl From<&Chunk> for DocumentSource {
    fn from(chunk: &Chunk) -> Self {
        Self {
            source_document: chunk.source_label().to_string(),
            article_number: chunk
                .metadata
                .article_number
                .clone()
                .unwrap_or_else(|| MISSING_ARTICLE.to_string()),
            content_chunk: chunk.page_content.clone(),
        }
    }
}

/// Final output of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub analysis: String,
    pub sources: Vec<DocumentSource>,
    pub token_usage: TokenUsage,
    pub trace_id: String,
}
