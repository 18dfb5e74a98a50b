//! Dense-vector ranking: cosine similarity between the question embedding
//! and each candidate embedding, clamped to `[0, 1]`, stable top-k.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::warn;
use webqa_core::traits::Embedder;
use webqa_core::types::{Ranking, ScoredCandidate};
use webqa_text::rank::{cosine, select_top_k};
use webqa_text::tfidf::FALLBACK_SCORE;

/// Score every candidate vector against the question vector.
pub fn similarity_scores(question: &[f32], candidates: &[Vec<f32>]) -> Vec<f32> {
    candidates.iter().map(|c| cosine(question, c).clamp(0.0, 1.0)).collect()
}

/// First candidate at [`FALLBACK_SCORE`], used when scoring failed.
pub fn first_candidate_fallback<S: AsRef<str>>(candidates: &[S], reason: String) -> Ranking {
    match candidates.first() {
        Some(first) => Ranking::Fallback {
            candidates: vec![ScoredCandidate::new(0, first.as_ref(), FALLBACK_SCORE)],
            reason,
        },
        None => Ranking::empty(),
    }
}

#[derive(Clone)]
pub struct EmbeddingRanker {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingRanker {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self { Self { embedder } }

    /// Rank candidates against the question. A single candidate scores 1.0
    /// without encoding anything.
    pub fn rank<S: AsRef<str>>(&self, question: &str, candidates: &[S], top_k: usize) -> Result<Ranking> {
        match candidates {
            [] => Ok(Ranking::empty()),
            [only] => Ok(Ranking::Scored(vec![ScoredCandidate::new(0, only.as_ref(), 1.0)])),
            _ => {
                let mut texts = Vec::with_capacity(candidates.len() + 1);
                texts.push(question.to_string());
                texts.extend(candidates.iter().map(|c| c.as_ref().to_string()));
                let mut vectors = self.embedder.embed_batch(&texts)?;
                if vectors.len() != texts.len() {
                    return Err(anyhow!("encoder returned {} vectors for {} texts", vectors.len(), texts.len()));
                }
                let rest = vectors.split_off(1);
                let scores = similarity_scores(&vectors[0], &rest);
                Ok(Ranking::Scored(select_top_k(candidates, &scores, top_k)))
            }
        }
    }

    /// Like [`EmbeddingRanker::rank`], degrading to the first candidate when
    /// encoding fails.
    pub fn rank_or_first<S: AsRef<str>>(&self, question: &str, candidates: &[S], top_k: usize) -> Ranking {
        self.rank(question, candidates, top_k).unwrap_or_else(|e| {
            warn!("Error finding relevant chunks: {}", e);
            first_candidate_fallback(candidates, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webqa_embed::FakeEmbedder;

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn dim(&self) -> usize { 4 }
        fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> { Err(anyhow!("device lost")) }
    }

    #[test]
    fn related_candidate_ranks_first() {
        let ranker = EmbeddingRanker::new(Arc::new(FakeEmbedder::new(384)));
        let candidates = ["Pasta cooks in salted water.", "Claude was created by Anthropic.", "Tides follow the moon."];
        let ranking = ranker.rank("Who created Claude?", &candidates, 2).unwrap();
        assert_eq!(ranking.candidates().len(), 2);
        assert_eq!(ranking.top().unwrap().index, 1);
        assert!(ranking.candidates().iter().all(|c| (0.0..=1.0).contains(&c.score)));
    }

    #[test]
    fn encoder_failure_falls_back_to_first() {
        let ranker = EmbeddingRanker::new(Arc::new(BrokenEmbedder));
        let ranking = ranker.rank_or_first("q", &["a", "b"], 3);
        assert!(ranking.is_fallback());
        assert_eq!(ranking.candidates(), &[ScoredCandidate::new(0, "a", FALLBACK_SCORE)]);
        // a single candidate never touches the encoder
        assert_eq!(ranker.rank("q", &["a"], 3).unwrap().top().unwrap().score, 1.0);
    }
}
