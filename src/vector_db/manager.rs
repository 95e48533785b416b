//! Qdrant-backed vector store
//!
//! Points carry a payload of the form
//! `{"page_content": "...", "metadata": {"source_document": "...", "article_number": "..."}}`
//! written by the ingestion job.

use anyhow::{anyhow, bail, Context, Result};
use qdrant_client::qdrant::{value::Kind, SearchPointsBuilder, Value as QdrantValue};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use tokio::runtime::Handle;
use tracing::info;

use crate::config::QdrantConfig;
use crate::types::{Chunk, ChunkMetadata};
use crate::vector_db::{SearchHit, VectorStore};

const CONTENT_KEY: &str = "page_content";
const METADATA_KEY: &str = "metadata";

/// Vector store backed by a Qdrant collection
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    handle: Handle,
}

impl QdrantStore {
    /// Connect to Qdrant
    ///
    /// `handle` is the runtime that drives the gRPC client; blocking
    /// searches are bridged onto it.
    pub fn connect(config: &QdrantConfig, handle: Handle) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .context("Qdrant URL is not configured")?;

        info!(url = %url, collection = %config.collection, "Initializing Qdrant client...");
        let client = Qdrant::from_url(url)
            .api_key(config.api_key.clone())
            .build()
            .context("Failed to create Qdrant client")?;
        info!("Qdrant client initialized.");

        Ok(Self {
            client,
            collection: config.collection.clone(),
            handle,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Check the server answers and the corpus collection exists
    pub async fn health_check(&self) -> Result<bool> {
        self.client
            .health_check()
            .await
            .context("Qdrant health check failed")?;
        let exists = self
            .client
            .collection_exists(self.collection.clone())
            .await
            .context("Failed to query collection")?;
        Ok(exists)
    }
}

impl VectorStore for QdrantStore {
    fn search(&self, vector: &[f32], limit: usize, with_payload: bool) -> Result<Vec<SearchHit>> {
        let request = SearchPointsBuilder::new(&self.collection, vector.to_vec(), limit as u64)
            .with_payload(with_payload);

        let response = self
            .handle
            .block_on(self.client.search_points(request))
            .context("Failed to search points")?;

        response
            .result
            .into_iter()
            .map(|point| {
                let payload = if with_payload {
                    Some(payload_to_chunk(point.payload)?)
                } else {
                    None
                };
                Ok(SearchHit {
                    score: point.score,
                    payload,
                })
            })
            .collect()
    }
}

/// Decode a point payload into a chunk
///
/// `page_content` is required. Missing metadata keys stay `None`; non-string
/// metadata values are stringified.
pub fn payload_to_chunk(mut payload: HashMap<String, QdrantValue>) -> Result<Chunk> {
    let page_content = match payload.remove(CONTENT_KEY).and_then(|v| v.kind) {
        Some(Kind::StringValue(text)) => text,
        Some(_) => bail!("payload field '{}' is not a string", CONTENT_KEY),
        None => bail!("payload is missing '{}'", CONTENT_KEY),
    };

    let metadata = match payload.remove(METADATA_KEY).and_then(|v| v.kind) {
        Some(Kind::StructValue(fields)) => {
            let mut fields = fields.fields;
            ChunkMetadata {
                source_document: fields
                    .remove("source_document")
                    .and_then(|v| value_to_string(&v)),
                article_number: fields
                    .remove("article_number")
                    .and_then(|v| value_to_string(&v)),
            }
        }
        Some(Kind::NullValue(_)) | None => ChunkMetadata::default(),
        Some(_) => return Err(anyhow!("payload field '{}' is not an object", METADATA_KEY)),
    };

    Ok(Chunk {
        page_content,
        metadata,
    })
}

fn value_to_string(value: &QdrantValue) -> Option<String> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(s.clone()),
        Kind::IntegerValue(i) => Some(i.to_string()),
        Kind::DoubleValue(f) => Some(f.to_string()),
        Kind::BoolValue(b) => Some(b.to_string()),
        _ => None,
    })
}
