//! Value types passed between segmenters, rankers and extractors.
//!
//! Everything here is a plain owned copy of text: a `Chunk` or `Sentence`
//! never points back at the document it came from.

use serde::{Deserialize, Serialize};

pub const NO_CONTENT_ANSWER: &str = "No content available to answer this question.";
pub const ERROR_ANSWER: &str = "Error processing the question.";
pub const NO_SPECIFIC_ANSWER: &str = "I couldn't find a specific answer in the provided content.";
pub const NO_RELATED_ANSWER: &str =
    "I couldn't find information related to your question in the provided content.";
pub const NO_RELEVANT_ANSWER: &str = "I couldn't find relevant information in the provided content.";
pub const MODEL_FAILURE_ANSWER: &str =
    "Sorry, I couldn't process that question with this model. Try using a different model.";

/// Confidence attached to "nothing found" answers.
pub const NOT_FOUND_CONFIDENCE: f32 = 0.1;

/// A sentence as produced by a splitter. `index` is its position among the
/// sentences that survived noise filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub index: usize,
    pub text: String,
}

/// A bounded run of consecutive units (sentences or paragraphs).
///
/// - `index`: position of the chunk in the document
/// - `units`: the packed units, in original order
/// - `size`: measured size under the packing measure (chars, words or units)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub units: Vec<String>,
    pub size: usize,
}

impl Chunk {
    /// Units joined by a single space.
    pub fn text(&self) -> String { self.units.join(" ") }
}

/// A text span with a ranker-specific score. Higher is better; magnitudes
/// are only comparable within one ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Position of the candidate in the ranker's input.
    pub index: usize,
    pub text: String,
    pub score: f32,
}

impl ScoredCandidate {
    pub fn new(index: usize, text: impl Into<String>, score: f32) -> Self {
        Self { index, text: text.into(), score }
    }
}

/// Outcome of a ranking pass.
///
/// `Fallback` carries the candidates the ranker settled for when it could not
/// score normally (for example an empty TF-IDF vocabulary) and why.
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    Scored(Vec<ScoredCandidate>),
    Fallback { candidates: Vec<ScoredCandidate>, reason: String },
}

impl Ranking {
    pub fn empty() -> Self { Self::Scored(Vec::new()) }

    pub fn candidates(&self) -> &[ScoredCandidate] {
        match self {
            Self::Scored(c) | Self::Fallback { candidates: c, .. } => c,
        }
    }

    pub fn into_candidates(self) -> Vec<ScoredCandidate> {
        match self {
            Self::Scored(c) | Self::Fallback { candidates: c, .. } => c,
        }
    }

    pub fn top(&self) -> Option<&ScoredCandidate> { self.candidates().first() }

    pub fn is_fallback(&self) -> bool { matches!(self, Self::Fallback { .. }) }
}

/// Final (answer, confidence, context) triple returned by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub confidence: f32,
    pub context: String,
}

impl AnswerResult {
    pub fn new(answer: impl Into<String>, confidence: f32, context: impl Into<String>) -> Self {
        Self { answer: answer.into(), confidence, context: context.into() }
    }

    /// Result for an empty question or empty content.
    pub fn no_content() -> Self { Self::new(NO_CONTENT_ANSWER, 0.0, "") }

    /// Result for any failure during scoring or extraction.
    pub fn error() -> Self { Self::new(ERROR_ANSWER, 0.0, "") }

    /// Fixed "nothing found" message at [`NOT_FOUND_CONFIDENCE`].
    pub fn not_found(message: &str) -> Self { Self::new(message, NOT_FOUND_CONFIDENCE, "") }

    /// Average this extraction score with a chunk relevance score. Both are
    /// clamped into `[0, 1]` first.
    pub fn blend(mut self, chunk_relevance: f32) -> Self {
        self.confidence = (clamp_unit(chunk_relevance) + clamp_unit(self.confidence)) / 2.0;
        self
    }

    pub fn as_tuple(&self) -> (&str, f32, &str) { (&self.answer, self.confidence, &self.context) }
}

/// Clamp into `[0, 1]`; NaN maps to 0.
pub fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Which input sequence a model token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSegment {
    Question,
    Context,
    Special,
}

/// One model token with its byte offsets into the question or the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPiece {
    pub segment: PieceSegment,
    pub start: usize,
    pub end: usize,
}

/// Per-token start/end scores from a span model over a (question, context) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanLogits {
    pub pieces: Vec<TokenPiece>,
    pub start: Vec<f32>,
    pub end: Vec<f32>,
}

impl SpanLogits {
    pub fn len(&self) -> usize { self.pieces.len() }

    pub fn is_empty(&self) -> bool { self.pieces.is_empty() }

    /// Reassemble tokens `from..to` into text. Special tokens are skipped and
    /// consecutive tokens of the same sequence are sliced from their source in
    /// one piece, so original spacing and casing survive.
    pub fn render(&self, from: usize, to: usize, question: &str, context: &str) -> String {
        let to = to.min(self.pieces.len());
        let mut parts: Vec<&str> = Vec::new();
        let mut run: Option<(PieceSegment, usize, usize)> = None;
        for piece in self.pieces.iter().take(to).skip(from) {
            if piece.segment == PieceSegment::Special {
                continue;
            }
            run = match run {
                Some((seg, s, _)) if seg == piece.segment => Some((seg, s, piece.end)),
                Some(prev) => {
                    push_slice(&mut parts, prev, question, context);
                    Some((piece.segment, piece.start, piece.end))
                }
                None => Some((piece.segment, piece.start, piece.end)),
            };
        }
        if let Some(last) = run {
            push_slice(&mut parts, last, question, context);
        }
        parts.join(" ")
    }
}

fn push_slice<'a>(parts: &mut Vec<&'a str>, run: (PieceSegment, usize, usize), question: &'a str, context: &'a str) {
    let (segment, start, end) = run;
    let source = match segment {
        PieceSegment::Question => question,
        PieceSegment::Context => context,
        PieceSegment::Special => return,
    };
    if let Some(s) = source.get(start..end) {
        let s = s.trim();
        if !s.is_empty() { parts.push(s); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_clamps_both_scores() {
        let r = AnswerResult::new("a", 3.0, "").blend(-0.4);
        assert!((r.confidence - 0.5).abs() < 1e-6);
        let r = AnswerResult::new("a", f32::NAN, "").blend(1.0);
        assert!((r.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn render_groups_pieces_by_sequence() {
        let question = "Who made it?";
        let context = "It was made by Acme Corp.";
        let pieces = vec![
            TokenPiece { segment: PieceSegment::Special, start: 0, end: 0 },
            TokenPiece { segment: PieceSegment::Question, start: 0, end: 3 },
            TokenPiece { segment: PieceSegment::Special, start: 0, end: 0 },
            TokenPiece { segment: PieceSegment::Context, start: 15, end: 19 },
            TokenPiece { segment: PieceSegment::Context, start: 20, end: 24 },
        ];
        let logits = SpanLogits { start: vec![0.0; 5], end: vec![0.0; 5], pieces };
        assert_eq!(logits.render(3, 5, question, context), "Acme Corp");
        assert_eq!(logits.render(0, 5, question, context), "Who Acme Corp");
        assert_eq!(logits.render(0, 1, question, context), "");
    }
}
