//! Type definitions module
//!
//! Request, corpus and report types shared by the pipeline stages.

pub mod chunk;
pub mod query;
pub mod report;

// Re-export commonly used types
pub use chunk::{Chunk, ChunkMetadata, RetrievedCandidate, UNKNOWN_SOURCE};
pub use query::{ComplianceQuery, DEFAULT_USER_ID, MIN_QUERY_CHARS};
pub use report::{ComplianceReport, DocumentSource, TokenUsage, MISSING_ARTICLE};
