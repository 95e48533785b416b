//! Query embedding
//!
//! The pipeline only needs one vector per query; batching and document
//! embedding belong to the ingestion job.

pub mod client;

pub use client::OpenAIEmbedder;

use anyhow::Result;
use async_trait::async_trait;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;
}
