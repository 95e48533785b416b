// Cross-encoder reranking of retrieved chunks
pub mod cross_encoder;
pub mod scorer;

pub use cross_encoder::CrossEncoder;
pub use scorer::{RankedCandidate, ReRanker, RelevanceModel};
