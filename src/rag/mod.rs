// Retrieval-augmented generation for compliance questions
//
// Components:
// - Re-ranking: cross-encoder ordering of retrieved chunks
// - Context: prompt formatting around the ranked chunks
// - Pipeline: end-to-end orchestration over the shared clients

pub mod context;
pub mod pipeline;
pub mod reranking;

// Re-export key types
pub use context::{format_docs_for_prompt, PromptFormatter};
pub use pipeline::{CompliancePipeline, PipelineContext};
pub use reranking::{CrossEncoder, ReRanker, RelevanceModel};
