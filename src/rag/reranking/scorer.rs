// Relevance ordering of retrieved chunks
use anyhow::{bail, Result};
use std::sync::Arc;

use crate::types::Chunk;

/// Jointly scores (query, passage) pairs; higher means more relevant
pub trait RelevanceModel: Send + Sync {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>>;
}

/// Chunk with its cross-encoder score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub chunk: Chunk,
    pub score: f32,
}

/// Re-ranker driven by a cross-encoder
#[derive(Clone)]
pub struct ReRanker {
    model: Arc<dyn RelevanceModel>,
}

impl ReRanker {
    pub fn new(model: Arc<dyn RelevanceModel>) -> Self {
        Self { model }
    }

    /// Order chunks by relevance to `query`, most relevant first
    ///
    /// The output is a permutation of the input. Equal scores keep their
    /// retrieval order.
    pub fn rerank(&self, query: &str, candidates: Vec<Chunk>) -> Result<Vec<Chunk>> {
        Ok(self
            .rerank_scored(query, candidates)?
            .into_iter()
            .map(|ranked| ranked.chunk)
            .collect())
    }

    /// Same ordering as [`ReRanker::rerank`], keeping the scores
    pub fn rerank_scored(&self, query: &str, candidates: Vec<Chunk>) -> Result<Vec<RankedCandidate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let pairs: Vec<(&str, &str)> = candidates
            .iter()
            .map(|chunk| (query, chunk.page_content.as_str()))
            .collect();
        let scores = self.model.predict(&pairs)?;

        if scores.len() != candidates.len() {
            bail!(
                "relevance model returned {} scores for {} candidates",
                scores.len(),
                candidates.len()
            );
        }

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(chunk, score)| RankedCandidate {
                chunk,
                // NaN sinks to the bottom instead of poisoning the sort
                score: if score.is_nan() { f32::NEG_INFINITY } else { score },
            })
            .collect();

        // sort_by is stable: ties keep retrieval order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scores each passage by its length, counting calls
    struct LengthModel {
        calls: AtomicUsize,
    }

    impl LengthModel {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RelevanceModel for LengthModel {
        fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(pairs.iter().map(|(_, text)| text.chars().count() as f32).collect())
        }
    }

    /// Returns fixed scores
    struct FixedModel(Vec<f32>);

    impl RelevanceModel for FixedModel {
        fn predict(&self, _pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts.iter().map(|t| Chunk::new(*t)).collect()
    }

    #[test]
    fn test_empty_input_skips_model() {
        let model = Arc::new(LengthModel::new());
        let ranker = ReRanker::new(model.clone());

        let ranked = ranker.rerank("consulta", Vec::new()).unwrap();
        assert!(ranked.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rerank_sorts_by_score() {
        let ranker = ReRanker::new(Arc::new(FixedModel(vec![0.1, 0.9, 0.5])));
        let ranked = ranker.rerank("consulta", chunks(&["a", "b", "c"])).unwrap();

        let order: Vec<&str> = ranked.iter().map(|c| c.page_content.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_retrieval_order() {
        let ranker = ReRanker::new(Arc::new(FixedModel(vec![0.5, 0.7, 0.5, 0.7])));
        let ranked = ranker.rerank("consulta", chunks(&["a", "b", "c", "d"])).unwrap();

        let order: Vec<&str> = ranked.iter().map(|c| c.page_content.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_nan_scores_rank_last() {
        let ranker = ReRanker::new(Arc::new(FixedModel(vec![f32::NAN, 0.2, -3.0])));
        let ranked = ranker.rerank_scored("consulta", chunks(&["a", "b", "c"])).unwrap();

        assert_eq!(ranked[0].chunk.page_content, "b");
        assert_eq!(ranked[1].chunk.page_content, "c");
        assert_eq!(ranked[2].chunk.page_content, "a");
    }

    #[test]
    fn test_score_count_mismatch_is_error() {
        let ranker = ReRanker::new(Arc::new(FixedModel(vec![0.5])));
        assert!(ranker.rerank("consulta", chunks(&["a", "b"])).is_err());
    }

    #[test]
    fn test_handles_very_long_and_empty_text() {
        let long = "palabra ".repeat(10_000);
        let ranker = ReRanker::new(Arc::new(LengthModel::new()));
        let ranked = ranker
            .rerank("consulta", chunks(&["", long.as_str(), "corto"]))
            .unwrap();
        assert_eq!(ranked[0].page_content, long);
        assert_eq!(ranked[2].page_content, "");
    }

    #[quickcheck]
    fn prop_rerank_is_permutation(texts: Vec<String>) -> bool {
        let ranker = ReRanker::new(Arc::new(LengthModel::new()));
        let input: Vec<Chunk> = texts.iter().map(|t| Chunk::new(t.clone())).collect();
        let output = ranker.rerank("consulta", input.clone()).unwrap();

        let mut before: Vec<String> = input.into_iter().map(|c| c.page_content).collect();
        let mut after: Vec<String> = output.into_iter().map(|c| c.page_content).collect();
        before.sort();
        after.sort();
        before == after
    }

    #[quickcheck]
    fn prop_rerank_scores_descending(texts: Vec<String>) -> bool {
        let ranker = ReRanker::new(Arc::new(LengthModel::new()));
        let input: Vec<Chunk> = texts.into_iter().map(Chunk::new).collect();
        let ranked = ranker.rerank_scored("consulta", input).unwrap();
        ranked.windows(2).all(|w| w[0].score >= w[1].score)
    }
}
