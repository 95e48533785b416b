// End-to-end compliance pipeline: embed -> retrieve -> rerank -> generate
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

use crate::config::PipelineConfig;
use crate::embedding::Embedder;
use crate::errors::{PipelineError, Result, Stage};
use crate::generation::{Generation, Generator};
use crate::rag::context::PromptFormatter;
use crate::rag::reranking::ReRanker;
use crate::telemetry::TraceContext;
use crate::types::{Chunk, ComplianceQuery, ComplianceReport, DocumentSource, RetrievedCandidate};
use crate::vector_db::VectorStore;

/// Shared clients, built once at startup and handed to every run
///
/// All handles are read-only; runs never mutate them.
#[derive(Clone)]
pub struct PipelineContext {
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
    pub reranker: ReRanker,
    pub generator: Arc<dyn Generator>,
}

/// Retrieval-augmented compliance pipeline
pub struct CompliancePipeline {
    context: PipelineContext,
    formatter: PromptFormatter,
    config: PipelineConfig,
}

impl CompliancePipeline {
    /// Create pipeline with default sizing (over-fetch 20, context 5)
    pub fn new(context: PipelineContext) -> Self {
        Self::with_config(context, PipelineConfig::default())
    }

    /// Create with custom sizing
    pub fn with_config(context: PipelineContext, config: PipelineConfig) -> Self {
        Self {
            context,
            formatter: PromptFormatter::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one compliance check
    ///
    /// Stages run strictly in order. Any stage failure aborts the run and
    /// nothing produced so far is returned.
    pub async fn run(&self, query: &ComplianceQuery, trace: &TraceContext) -> Result<ComplianceReport> {
        query.validate()?;

        let span = trace.span(&query.user_id);
        self.run_stages(query, trace).instrument(span).await
    }

    /// [`CompliancePipeline::run`] bounded by an overall deadline
    ///
    /// On expiry the run is dropped. A blocking stage already handed to the
    /// worker pool finishes in the background and its result is discarded.
    pub async fn run_with_deadline(
        &self,
        query: &ComplianceQuery,
        trace: &TraceContext,
        deadline: Duration,
    ) -> Result<ComplianceReport> {
        tokio::time::timeout(deadline, self.run(query, trace))
            .await
            .map_err(|_| PipelineError::DeadlineExceeded {
                duration_ms: deadline.as_millis() as u64,
            })?
    }

    async fn run_stages(&self, query: &ComplianceQuery, trace: &TraceContext) -> Result<ComplianceReport> {
        let vector = self.embed(&query.text).await?;
        let candidates = self.retrieve(vector).await?;
        let context = self.rerank(&query.text, candidates).await?;
        let generation = self.generate(&context, &query.text).await?;

        Ok(ComplianceReport {
            analysis: generation.text,
            sources: context.iter().map(DocumentSource::from).collect(),
            token_usage: generation.usage,
            trace_id: trace.trace_id().to_string(),
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        info!("embedding_started");
        let vector = self
            .context
            .embedder
            .embed(text)
            .await
            .map_err(upstream(Stage::Embedding))?;

        let expected = self.context.embedder.dimension();
        if vector.len() != expected {
            return Err(PipelineError::upstream(
                Stage::Embedding,
                format!("embedder returned {} dimensions, expected {}", vector.len(), expected),
            ));
        }
        info!(dimension = vector.len(), "embedding_finished");
        Ok(vector)
    }

    async fn retrieve(&self, vector: Vec<f32>) -> Result<Vec<RetrievedCandidate>> {
        info!("retrieval_started");
        let store = Arc::clone(&self.context.store);
        let limit = self.config.retrieval_limit;

        let hits = tokio::task::spawn_blocking(move || store.search(&vector, limit, true))
            .await
            .map_err(|e| PipelineError::upstream(Stage::Retrieval, e))?
            .map_err(upstream(Stage::Retrieval))?;

        let candidates = hits
            .into_iter()
            .map(|hit| {
                hit.payload
                    .map(|chunk| RetrievedCandidate::new(chunk, hit.score))
                    .ok_or_else(|| {
                        PipelineError::upstream(Stage::Retrieval, "search hit returned without payload")
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        // Hits arrive best-first
        let top_score = candidates.first().map(|c| c.score);
        info!(num_docs = candidates.len(), top_score = ?top_score, "retrieval_finished");
        Ok(candidates)
    }

    async fn rerank(&self, query: &str, candidates: Vec<RetrievedCandidate>) -> Result<Vec<Chunk>> {
        info!("reranking_started");
        let reranker = self.context.reranker.clone();
        let query = query.to_string();
        let chunks: Vec<Chunk> = candidates.into_iter().map(|c| c.chunk).collect();

        let mut ranked = tokio::task::spawn_blocking(move || reranker.rerank(&query, chunks))
            .await
            .map_err(|e| PipelineError::upstream(Stage::Reranking, e))?
            .map_err(upstream(Stage::Reranking))?;
        ranked.truncate(self.config.context_size);

        info!(num_docs_after = ranked.len(), "reranking_finished");
        Ok(ranked)
    }

    async fn generate(&self, context: &[Chunk], question: &str) -> Result<Generation> {
        info!("llm_generation_started");
        let prompt = self.formatter.render(context, question);
        let generation = self
            .context
            .generator
            .generate(&prompt)
            .await
            .map_err(upstream(Stage::Generation))?;

        info!(
            prompt_tokens = generation.usage.prompt_tokens,
            completion_tokens = generation.usage.completion_tokens,
            "llm_generation_finished"
        );
        Ok(generation)
    }
}

/// Map a collaborator error to an upstream failure, keeping its context chain
fn upstream(stage: Stage) -> impl FnOnce(anyhow::Error) -> PipelineError {
    move |err| PipelineError::upstream(stage, format!("{:#}", err))
}
