//! GuardianAI - compliance answers over a legal corpus
//!
//! A retrieval-augmented pipeline for questions about Chile's personal data
//! protection law (Ley 21.719).
//!
//! # Architecture
//!
//! - **Embedding**: query text to vector (OpenAI embeddings)
//! - **Vector search**: nearest chunks from Qdrant, run on the blocking pool
//! - **Reranking**: cross-encoder ordering, run on the blocking pool
//! - **Generation**: templated prompt to the chat model
//! - **Service**: trace ids, logging, caller-safe failures

pub mod errors;
pub mod types;

// Re-export commonly used types
pub use errors::{PipelineError, Result, Stage};

// Collaborators
pub mod embedding;
pub mod generation;
pub mod vector_db;

// Pipeline core
pub mod rag;
pub mod service;

// Startup, configuration and operations
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod doctor;
pub mod telemetry;
