//! TF-IDF cosine ranking over a vocabulary fitted on the candidates plus
//! the question.
//!
//! Weights follow the smoothed scheme `idf = ln((1 + n) / (1 + df)) + 1` with
//! raw term counts and L2-normalized rows, so scores lie in `[0, 1]`. Terms
//! come from the tantivy pipeline in [`crate::analyzer`] and must be at least
//! two characters long.

use std::collections::BTreeMap;

use tracing::warn;
use webqa_core::types::{Ranking, ScoredCandidate};

use crate::analyzer::{AnalyzerOptions, TermAnalyzer};
use crate::rank::select_top_k;

/// Score used for the first candidate when no vocabulary could be built.
pub const FALLBACK_SCORE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct TfIdfRanker {
    analyzer: TermAnalyzer,
}

impl TfIdfRanker {
    pub fn new(remove_stop_words: bool) -> Self {
        let analyzer = TermAnalyzer::new(AnalyzerOptions { remove_stop_words, stem: false }).with_min_term_chars(2);
        Self { analyzer }
    }

    /// Cosine similarity of the question against each candidate, or `None`
    /// when the joint vocabulary is empty.
    pub fn similarities<S: AsRef<str>>(&self, question: &str, candidates: &[S]) -> Option<Vec<f32>> {
        let docs: Vec<Vec<String>> = candidates
            .iter()
            .map(|c| self.analyzer.terms(c.as_ref()))
            .chain(std::iter::once(self.analyzer.terms(question)))
            .collect();

        let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
        for term in docs.iter().flatten() {
            let next = vocabulary.len();
            vocabulary.entry(term.as_str()).or_insert(next);
        }
        if vocabulary.is_empty() {
            return None;
        }

        let mut df = vec![0usize; vocabulary.len()];
        let counts: Vec<BTreeMap<usize, f32>> = docs
            .iter()
            .map(|doc| {
                let mut tf: BTreeMap<usize, f32> = BTreeMap::new();
                for term in doc {
                    *tf.entry(vocabulary[term.as_str()]).or_default() += 1.0;
                }
                for id in tf.keys() {
                    df[*id] += 1;
                }
                tf
            })
            .collect();

        let n = docs.len() as f32;
        let idf: Vec<f32> = df.iter().map(|d| ((1.0 + n) / (1.0 + *d as f32)).ln() + 1.0).collect();
        let rows: Vec<BTreeMap<usize, f32>> = counts
            .into_iter()
            .map(|tf| {
                let mut row: BTreeMap<usize, f32> = tf.into_iter().map(|(id, c)| (id, c * idf[id])).collect();
                let norm = row.values().map(|w| w * w).sum::<f32>().sqrt();
                if norm > 0.0 {
                    row.values_mut().for_each(|w| *w /= norm);
                }
                row
            })
            .collect();

        let (query, rest) = rows.split_last()?;
        Some(
            rest.iter()
                .map(|row| query.iter().filter_map(|(id, w)| row.get(id).map(|v| v * w)).sum::<f32>().clamp(0.0, 1.0))
                .collect(),
        )
    }

    /// Rank candidates against the question, best `top_k` first.
    ///
    /// A single candidate scores 1.0 without vectorization. An empty
    /// vocabulary yields [`Ranking::Fallback`] holding the first candidate at
    /// [`FALLBACK_SCORE`].
    pub fn rank<S: AsRef<str>>(&self, question: &str, candidates: &[S], top_k: usize) -> Ranking {
        match candidates {
            [] => Ranking::empty(),
            [only] => Ranking::Scored(vec![ScoredCandidate::new(0, only.as_ref(), 1.0)]),
            [first, ..] => match self.similarities(question, candidates) {
                Some(scores) => Ranking::Scored(select_top_k(candidates, &scores, top_k)),
                None => {
                    warn!("TF-IDF vocabulary is empty, keeping the first candidate");
                    Ranking::Fallback {
                        candidates: vec![ScoredCandidate::new(0, first.as_ref(), FALLBACK_SCORE)],
                        reason: "empty vocabulary".to_string(),
                    }
                }
            },
        }
    }
}
