use std::sync::Arc;

use anyhow::{anyhow, Result};
use webqa_core::config::SpanConfig;
use webqa_core::traits::{SpanModel, Strategy};
use webqa_core::types::{PieceSegment, SpanLogits, TokenPiece, ERROR_ANSWER, NO_SPECIFIC_ANSWER};
use webqa_embed::{FakeEmbedder, FAKE_EMBEDDING_DIM};
use webqa_strategies::SpanStrategy;

const CLAUDE: &str =
    "Claude is an AI assistant created by Anthropic. It was designed to be helpful, harmless, and honest.";

/// Whitespace tokens with byte offsets.
fn words(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, text.len()));
    }
    out
}

/// Lays out `[CLS] question [SEP] context [SEP]` by whitespace and puts a
/// high start logit on the context word `start_word` and a high end logit on
/// `end_word`. [CLS] states come from the hashing embedder.
struct ScriptedSpanModel {
    start_word: &'static str,
    end_word: &'static str,
    fail: bool,
    cls: FakeEmbedder,
}

impl ScriptedSpanModel {
    fn new(start_word: &'static str, end_word: &'static str) -> Self {
        Self { start_word, end_word, fail: false, cls: FakeEmbedder::new(FAKE_EMBEDDING_DIM) }
    }
}

impl SpanModel for ScriptedSpanModel {
    fn cls_embedding(&self, text: &str) -> Result<Vec<f32>> { Ok(self.cls.embed_text(text)) }

    fn span_logits(&self, question: &str, context: &str) -> Result<SpanLogits> {
        if self.fail {
            return Err(anyhow!("tensor shape mismatch"));
        }
        let special = TokenPiece { segment: PieceSegment::Special, start: 0, end: 0 };
        let mut pieces = vec![special.clone()];
        let (mut start, mut end) = (vec![0.0], vec![0.0]);
        for (s, e) in words(question) {
            pieces.push(TokenPiece { segment: PieceSegment::Question, start: s, end: e });
            start.push(0.0);
            end.push(0.0);
        }
        pieces.push(special.clone());
        start.push(0.0);
        end.push(0.0);
        for (s, e) in words(context) {
            let word = &context[s..e];
            pieces.push(TokenPiece { segment: PieceSegment::Context, start: s, end: e });
            start.push(if word == self.start_word { 9.0 } else { 0.0 });
            end.push(if word == self.end_word { 9.0 } else { 0.0 });
        }
        pieces.push(special);
        start.push(0.0);
        end.push(0.0);
        Ok(SpanLogits { pieces, start, end })
    }
}

fn strategy(model: ScriptedSpanModel, config: SpanConfig) -> SpanStrategy { SpanStrategy::new(Arc::new(model), config) }

#[test]
fn anthropic_scenario_extracts_the_creator() {
    let s = strategy(ScriptedSpanModel::new("Anthropic.", "Anthropic."), SpanConfig::default());
    let r = s.answer_question("Who created Claude?", CLAUDE);
    assert_eq!(r.answer, "Anthropic.");
    assert!(r.confidence > 0.1 && r.confidence <= 1.0, "{}", r.confidence);
    // window of ten pieces reaches back into the question
    assert!(r.context.contains("created by Anthropic."), "{}", r.context);
}

#[test]
fn multi_word_answers_keep_source_spacing() {
    let s = strategy(ScriptedSpanModel::new("helpful,", "honest."), SpanConfig { context_window: 0, ..SpanConfig::default() });
    let r = s.answer_question("How was it designed?", CLAUDE);
    assert_eq!(r.answer, "helpful, harmless, and honest.");
}

#[test]
fn relevant_paragraph_is_selected_before_extraction() {
    let content = format!("Pasta cooks in salted water for ten minutes.\n\n{CLAUDE}");
    let config = SpanConfig { max_chunk_words: 20, ..SpanConfig::default() };
    let s = strategy(ScriptedSpanModel::new("Anthropic.", "Anthropic."), config);
    assert_eq!(s.chunks(&content).len(), 2);
    let r = s.answer_question("Who created Claude?", &content);
    assert_eq!(r.answer, "Anthropic.");
}

#[test]
fn punctuation_only_span_is_not_an_answer() {
    let s = strategy(ScriptedSpanModel::new(".", "."), SpanConfig::default());
    let r = s.answer_question("What is the value?", "The value is 42 .");
    assert_eq!(r.answer, NO_SPECIFIC_ANSWER);
    // not-found 0.1 averaged with the single chunk's 1.0
    assert!((r.confidence - 0.55).abs() < 1e-6);
}

#[test]
fn extraction_failure_returns_the_error_answer() {
    let model = ScriptedSpanModel { fail: true, ..ScriptedSpanModel::new("x", "x") };
    let s = strategy(model, SpanConfig::default());
    assert_eq!(s.answer_question("Who created Claude?", CLAUDE).as_tuple(), (ERROR_ANSWER, 0.0, ""));
}

#[test]
fn whitespace_only_content_finds_nothing() {
    let s = strategy(ScriptedSpanModel::new("x", "x"), SpanConfig::default());
    let r = s.answer_question("Who?", "\n\n   \n\n");
    assert_eq!(r.as_tuple(), (NO_SPECIFIC_ANSWER, 0.05, ""));
}
