use crate::types::{AnswerResult, SpanLogits};

/// Dense sentence encoder. Vectors are L2-normalized and share `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Extractive QA model scoring answer boundaries token by token.
pub trait SpanModel: Send + Sync {
    /// Final-layer hidden state of the leading classification token.
    fn cls_embedding(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    fn span_logits(&self, question: &str, context: &str) -> anyhow::Result<SpanLogits>;
}

/// One interchangeable question-answering pipeline.
///
/// `answer_question` never fails: every internal error degrades to a
/// low-confidence [`AnswerResult`].
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool { true }
    fn answer_question(&self, question: &str, content: &str) -> AnswerResult;
}

/// Turns a source URL into plain text.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, url: &str) -> crate::error::Result<String>;
}

/// A token as seen by the linguistic analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    pub text: String,
    /// Byte offset of the token in the analyzed text.
    pub offset: usize,
    pub is_alpha: bool,
    pub is_stop: bool,
}

impl LexToken {
    pub fn lower(&self) -> String { self.text.to_lowercase() }
}

/// A named-entity mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Coarse syntactic role of a token inside its clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyRole {
    Subject,
    DirectObject,
    PrepositionalObject,
    Other,
}

impl DependencyRole {
    /// Subject or object-like roles.
    pub fn is_argument(self) -> bool { !matches!(self, Self::Other) }
}

/// Tokenization, entity spans and dependency roles for the heuristic rankers.
pub trait LinguisticAnalyzer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<LexToken>;
    fn entities(&self, text: &str) -> Vec<EntitySpan>;
    /// Role of `tokens[index]` within `tokens`.
    fn dependency_role(&self, tokens: &[LexToken], index: usize) -> DependencyRole;
}
