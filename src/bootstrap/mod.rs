//! Startup wiring for GuardianAI
//!
//! Builds every shared client exactly once from the loaded configuration.
//! Any failure here is fatal: the process must not serve traffic without
//! all four collaborators.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info};

use crate::config::Config;
use crate::embedding::OpenAIEmbedder;
use crate::generation::OpenAIChatClient;
use crate::rag::{CompliancePipeline, CrossEncoder, PipelineContext, ReRanker};
use crate::vector_db::QdrantStore;

/// Construct the shared client context
///
/// Must be called from inside the runtime that will serve requests.
pub async fn build_context(config: &Config) -> Result<PipelineContext> {
    let result = build_context_inner(config).await;
    match &result {
        Ok(_) => info!("All clients initialized successfully"),
        Err(e) => error!(error = %format!("{:#}", e), "An error occurred during client initialization"),
    }
    result
}

async fn build_context_inner(config: &Config) -> Result<PipelineContext> {
    let store = QdrantStore::connect(&config.qdrant, Handle::current())?;

    info!(model = %config.openai.embedding_model, "Initializing OpenAI embedding model...");
    let embedder = OpenAIEmbedder::new(&config.openai, config.pipeline.embedding_dimension)?;
    info!("OpenAI embedding model initialized.");

    // Weight loading reads and maps hundreds of MB; keep it off the scheduler
    let reranker_config = config.reranker.clone();
    let cross_encoder = tokio::task::spawn_blocking(move || CrossEncoder::load(&reranker_config))
        .await
        .context("Reranker loading task failed")??;

    info!(model = %config.openai.chat_model, "Initializing OpenAI chat model...");
    let generator = OpenAIChatClient::new(&config.openai)?;
    info!("OpenAI chat model initialized.");

    Ok(PipelineContext {
        embedder: Arc::new(embedder),
        store: Arc::new(store),
        reranker: ReRanker::new(Arc::new(cross_encoder)),
        generator: Arc::new(generator),
    })
}

/// Build the pipeline over a freshly constructed context
pub async fn build_pipeline(config: &Config) -> Result<CompliancePipeline> {
    let context = build_context(config).await?;
    Ok(CompliancePipeline::with_config(context, config.pipeline.clone()))
}

/// Runtime for serving: one scheduling thread, blocking stages on a pool
/// bounded by `runtime.max_blocking_threads`.
pub fn build_runtime(config: &Config) -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(config.runtime.max_blocking_threads)
        .thread_name("guardian-worker")
        .build()
}
