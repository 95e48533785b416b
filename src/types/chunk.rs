//! Corpus chunk types
//!
//! Chunks are written by the ingestion job and only ever read here.

use serde::{Deserialize, Serialize};

/// Label used when a chunk carries no `source_document`
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Identifying metadata stored next to each chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_number: Option<String>,
}

/// A bounded segment of source text plus its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub page_content: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// Attach a source document name
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source_document = Some(source.into());
        self
    }

    /// Attach an article number
    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.metadata.article_number = Some(article.into());
        self
    }

    /// Source document name, falling back to [`UNKNOWN_SOURCE`]
    pub fn source_label(&self) -> &str {
        self.metadata
            .source_document
            .as_deref()
            .unwrap_or(UNKNOWN_SOURCE)
    }
}

/// A chunk returned by vector search, with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedCandidate {
    pub chunk: Chunk,
    pub score: f32,
}

impl RetrievedCandidate {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }
}
