//! The always-available strategy: TF-IDF picks the best chunk, keyword and
//! entity heuristics assemble the answer from its sentences.

use std::sync::Arc;

use tracing::{debug, info};
use webqa_core::config::HeuristicConfig;
use webqa_core::traits::{LinguisticAnalyzer, Strategy};
use webqa_core::types::{clamp_unit, AnswerResult, NO_SPECIFIC_ANSWER};
use webqa_text::keyword::{HeuristicRanker, QuestionProfile};
use webqa_text::segment::collapse_whitespace;
use webqa_text::{GreedyPacker, Measure, Segmenter, SentenceSplitter, TfIdfRanker};

use crate::DEFAULT_MODEL;

/// Confidence when the question names no entities.
const NO_ENTITY_CONFIDENCE: f32 = 0.5;

pub struct HeuristicStrategy {
    config: HeuristicConfig,
    segmenter: Segmenter,
    tfidf: TfIdfRanker,
    ranker: HeuristicRanker,
}

impl HeuristicStrategy {
    pub fn new(config: HeuristicConfig, analyzer: Arc<dyn LinguisticAnalyzer>) -> Self {
        let segmenter = Segmenter::new(
            SentenceSplitter::Punctuation,
            config.min_sentence_chars,
            GreedyPacker::new(config.max_chunk_chars, Measure::Chars),
        );
        Self { config, segmenter, tfidf: TfIdfRanker::new(true), ranker: HeuristicRanker::new(analyzer) }
    }

    /// Answer from one chunk of text. The returned confidence is the
    /// extraction score only.
    pub fn extract(&self, question: &str, text: &str) -> AnswerResult {
        let profile = self.ranker.profile(question);
        let sentences: Vec<String> =
            SentenceSplitter::Punctuation.split(text, 1).into_iter().map(|s| s.text).collect();
        let ranked = self.ranker.rank(&profile, &sentences, usize::MAX).into_candidates();

        let Some(top) = ranked.first() else {
            return best_keyword_match(&profile, &sentences)
                .unwrap_or_else(|| AnswerResult::not_found(NO_SPECIFIC_ANSWER));
        };
        let join = |n: usize| ranked.iter().take(n).map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        let confidence = if profile.entity_count() > 0 {
            top.score / (profile.entity_count() as f32 + 2.0)
        } else {
            NO_ENTITY_CONFIDENCE
        };
        debug!(top_score = top.score, entities = profile.entity_count(), "heuristic extraction");
        AnswerResult::new(
            join(self.config.answer_sentences),
            confidence.min(self.config.confidence_cap),
            join(self.config.context_sentences),
        )
    }
}

/// The sentence containing the most question keywords, scored as the share
/// of keywords it contains. `None` when no sentence contains any.
pub fn best_keyword_match(profile: &QuestionProfile, sentences: &[String]) -> Option<AnswerResult> {
    let total = profile.keyword_count();
    if total == 0 {
        return None;
    }
    let mut best: Option<(&str, usize)> = None;
    for sentence in sentences {
        let hits = profile.keyword_hits(sentence);
        if hits > best.map_or(0, |(_, h)| h) {
            best = Some((sentence, hits));
        }
    }
    best.map(|(s, hits)| AnswerResult::new(s, clamp_unit(hits as f32 / total as f32), s))
}

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &str { DEFAULT_MODEL }

    fn answer_question(&self, question: &str, content: &str) -> AnswerResult {
        info!("Answering question: {}", question);
        if question.is_empty() || content.is_empty() {
            return AnswerResult::no_content();
        }
        let question = collapse_whitespace(question);
        let content = collapse_whitespace(content);

        let chunks: Vec<String> = self.segmenter.segment(&content).iter().map(|c| c.text()).collect();
        let ranking = self.tfidf.rank(&question, &chunks, 1);
        let (chunk, chunk_score) = ranking.top().map_or(("", 0.0), |c| (c.text.as_str(), c.score));
        debug!(chunks = chunks.len(), chunk_score, fallback = ranking.is_fallback(), "chunk selected");

        self.extract(&question, chunk).blend(chunk_score)
    }
}
