//! Sentence-embedding strategies. Content is split into sentences, grouped
//! into fixed-count chunks, the best chunks are found by embedding
//! similarity, and their sentences are re-ranked the same way to assemble
//! the answer.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use webqa_core::config::SemanticConfig;
use webqa_core::traits::{Embedder, Strategy};
use webqa_core::types::{AnswerResult, ERROR_ANSWER, MODEL_FAILURE_ANSWER, NO_RELEVANT_ANSWER};
use webqa_text::segment::collapse_whitespace;
use webqa_text::{GreedyPacker, Measure, Segmenter, SentenceSplitter};

use crate::rank::EmbeddingRanker;

pub const UNIVERSAL_ENCODER_MODEL: &str = "universal-encoder";
pub const SENTENCE_TRANSFORMER_MODEL: &str = "sentence-transformer";

pub struct SemanticStrategy {
    name: &'static str,
    config: SemanticConfig,
    segmenter: Segmenter,
    ranker: EmbeddingRanker,
    /// Returned when anything after validation fails.
    terminal: AnswerResult,
}

impl SemanticStrategy {
    pub fn new(name: &'static str, config: SemanticConfig, embedder: Arc<dyn Embedder>, terminal: AnswerResult) -> Self {
        let segmenter = Segmenter::new(
            SentenceSplitter::Heuristic,
            config.min_sentence_chars,
            GreedyPacker::new(config.chunk_sentences, Measure::Units),
        );
        Self { name, config, segmenter, ranker: EmbeddingRanker::new(embedder), terminal }
    }

    /// Three-sentence chunks; failures answer with an apology naming the model.
    pub fn universal_encoder(config: SemanticConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self::new(UNIVERSAL_ENCODER_MODEL, config, embedder, AnswerResult::new(MODEL_FAILURE_ANSWER, 0.0, ""))
    }

    /// Five-sentence chunks; failures answer with the generic error.
    pub fn sentence_transformer(config: SemanticConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self::new(SENTENCE_TRANSFORMER_MODEL, config, embedder, AnswerResult::new(ERROR_ANSWER, 0.0, ""))
    }

    fn run(&self, question: &str, content: &str) -> Result<AnswerResult> {
        let chunks: Vec<String> = self.segmenter.segment(content).iter().map(|c| c.text()).collect();
        let ranked = self.ranker.rank_or_first(question, &chunks, self.config.top_chunks).into_candidates();
        let Some(best_chunk) = ranked.first() else {
            return Ok(AnswerResult::not_found(NO_RELEVANT_ANSWER));
        };

        let sentences: Vec<String> = ranked
            .iter()
            .flat_map(|c| self.segmenter.to_sentences(&c.text))
            .map(|s| s.text)
            .collect();
        if sentences.is_empty() {
            return Ok(AnswerResult::new(best_chunk.text.as_str(), best_chunk.score, best_chunk.text.as_str())
                .blend(best_chunk.score));
        }

        let top = self.ranker.rank(question, &sentences, self.config.top_sentences)?.into_candidates();
        let join = |n: usize| top.iter().take(n).map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        let sentence_score = top.first().map_or(0.0, |c| c.score);
        Ok(AnswerResult::new(join(self.config.answer_sentences), sentence_score, join(top.len()))
            .blend(best_chunk.score))
    }
}

impl Strategy for SemanticStrategy {
    fn name(&self) -> &str { self.name }

    fn answer_question(&self, question: &str, content: &str) -> AnswerResult {
        info!("Answering question using {}: {}", self.name, question);
        if question.is_empty() || content.is_empty() {
            return AnswerResult::no_content();
        }
        let question = collapse_whitespace(question);
        let content = collapse_whitespace(content);
        match self.run(&question, &content) {
            Ok(result) => result,
            Err(e) => {
                error!("Error answering question with {}: {}", self.name, e);
                self.terminal.clone()
            }
        }
    }
}
