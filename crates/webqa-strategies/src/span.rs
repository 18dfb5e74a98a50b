//! Extractive span strategy over a [`SpanModel`].
//!
//! Content is split into paragraphs, packed into word-bounded chunks, the
//! chunk closest to the question by [CLS] embedding is selected, and the
//! model's start/end logits over the (question, chunk) pair pick the answer.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, error, info, warn};
use webqa_core::config::SpanConfig;
use webqa_core::traits::{SpanModel, Strategy};
use webqa_core::types::{AnswerResult, Ranking, NO_SPECIFIC_ANSWER};
use webqa_text::rank::select_top_k;
use webqa_text::segment::{collapse_whitespace, paragraphs};
use webqa_text::{GreedyPacker, Measure};

use crate::rank::{first_candidate_fallback, similarity_scores};

pub const SPAN_MODEL: &str = "distilbert";

/// Logit written over the rejected end position before re-picking.
const MASKED_LOGIT: f32 = -100.0;
/// Answers made only of these characters are not answers.
const PUNCTUATION: &str = ".,;:!?-";

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the first maximum.
fn argmax(xs: &[f32]) -> Option<usize> {
    xs.iter().enumerate().fold(None, |best: Option<(usize, f32)>, (i, &x)| match best {
        Some((_, b)) if b >= x => best,
        _ => Some((i, x)),
    })
    .map(|(i, _)| i)
}

/// Chosen boundaries and the end logits they were chosen from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanChoice {
    pub start: usize,
    pub end: usize,
    /// End logits after the single repair, if one happened.
    pub end_logits: Vec<f32>,
}

impl SpanChoice {
    pub fn is_empty(&self) -> bool { self.end < self.start }

    /// Mean of the softmax probabilities at the chosen start and end.
    pub fn confidence(&self, start_logits: &[f32]) -> f32 {
        let p_start = softmax(start_logits).get(self.start).copied().unwrap_or(0.0);
        let p_end = softmax(&self.end_logits).get(self.end).copied().unwrap_or(0.0);
        (p_start + p_end) / 2.0
    }
}

/// Independent argmax of start and end. When the end lands before the start,
/// the end logit at the start position is masked and the end re-picked once.
/// The result may still be an empty span.
pub fn select_span(start_logits: &[f32], end_logits: &[f32]) -> Option<SpanChoice> {
    let start = argmax(start_logits)?;
    let mut end_logits = end_logits.to_vec();
    let mut end = argmax(&end_logits)?;
    if end < start {
        if let Some(slot) = end_logits.get_mut(start) {
            *slot = MASKED_LOGIT;
        }
        end = argmax(&end_logits)?;
    }
    Some(SpanChoice { start, end, end_logits })
}

fn is_blank_answer(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.is_empty() || PUNCTUATION.contains(trimmed)
}

pub struct SpanStrategy {
    model: Arc<dyn SpanModel>,
    config: SpanConfig,
}

impl SpanStrategy {
    pub fn new(model: Arc<dyn SpanModel>, config: SpanConfig) -> Self { Self { model, config } }

    /// Paragraphs packed greedily under the word budget.
    pub fn chunks(&self, content: &str) -> Vec<String> {
        let paras = paragraphs(content);
        GreedyPacker::new(self.config.max_chunk_words, Measure::Words).pack(&paras).iter().map(|c| c.text()).collect()
    }

    fn try_rank(&self, question: &str, chunks: &[String]) -> Result<Ranking> {
        let q = self.model.cls_embedding(question)?;
        let vectors = chunks.iter().map(|c| self.model.cls_embedding(c)).collect::<Result<Vec<_>>>()?;
        Ok(Ranking::Scored(select_top_k(chunks, &similarity_scores(&q, &vectors), 1)))
    }

    /// Best chunk by cosine of [CLS] states. One chunk scores 1.0 without the
    /// model; model failure keeps the first chunk at 0.5.
    pub fn rank_chunks(&self, question: &str, chunks: &[String]) -> Ranking {
        match chunks {
            [] => Ranking::empty(),
            [_] => Ranking::Scored(select_top_k(chunks, &[1.0], 1)),
            _ => self.try_rank(question, chunks).unwrap_or_else(|e| {
                warn!("Error finding relevant chunk: {}", e);
                first_candidate_fallback(chunks, e.to_string())
            }),
        }
    }

    /// Extraction score only; combine with the chunk score separately.
    pub fn extract(&self, question: &str, text: &str) -> Result<AnswerResult> {
        let logits = self.model.span_logits(question, text)?;
        if logits.is_empty() || logits.start.len() != logits.len() || logits.end.len() != logits.len() {
            bail!("span model returned {} pieces, {} start and {} end logits", logits.len(), logits.start.len(), logits.end.len());
        }
        let Some(choice) = select_span(&logits.start, &logits.end) else {
            bail!("no span could be selected");
        };
        debug!(start = choice.start, end = choice.end, "span selected");

        let answer = logits.render(choice.start, choice.end + 1, question, text);
        if choice.is_empty() || is_blank_answer(&answer) {
            return Ok(AnswerResult::not_found(NO_SPECIFIC_ANSWER));
        }
        let window = self.config.context_window;
        let context = logits.render(
            choice.start.saturating_sub(window),
            (choice.end + window).min(logits.len()),
            question,
            text,
        );
        Ok(AnswerResult::new(answer, choice.confidence(&logits.start), context))
    }
}

impl Strategy for SpanStrategy {
    fn name(&self) -> &str { SPAN_MODEL }

    fn answer_question(&self, question: &str, content: &str) -> AnswerResult {
        info!("Answering question using DistilBERT: {}", question);
        if question.is_empty() || content.is_empty() {
            return AnswerResult::no_content();
        }
        let question = collapse_whitespace(question);
        let chunks = self.chunks(content);
        let ranking = self.rank_chunks(&question, &chunks);
        let Some(best) = ranking.top() else {
            return AnswerResult::not_found(NO_SPECIFIC_ANSWER).blend(0.0);
        };
        match self.extract(&question, &best.text) {
            Ok(result) => result.blend(best.score),
            Err(e) => {
                error!("Error extracting answer: {}", e);
                AnswerResult::error()
            }
        }
    }
}
