//! Vector search over the persisted corpus collection
//!
//! Search is a blocking call. Callers running on the async scheduler must
//! go through `tokio::task::spawn_blocking`.

pub mod manager;

pub use manager::QdrantStore;

use anyhow::Result;

use crate::types::Chunk;

/// One nearest-neighbour hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub score: f32,
    /// Present when the search asked for payloads
    pub payload: Option<Chunk>,
}

/// Nearest-neighbour lookup against a pre-populated collection
pub trait VectorStore: Send + Sync {
    /// Return up to `limit` hits ordered by decreasing similarity
    fn search(&self, vector: &[f32], limit: usize, with_payload: bool) -> Result<Vec<SearchHit>>;
}
