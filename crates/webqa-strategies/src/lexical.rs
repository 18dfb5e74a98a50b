//! Lexical strategy: stemmed key-term overlap plus TF-IDF similarity over
//! sentences, with factoid-aware answer selection.
//!
//! Sentence scores: +2 per key term present, +1 for 5..=25 terms or -1 above
//! 25, question-type bonuses, then `tfidf_weight` x TF-IDF cosine. Chunk
//! confidence is the mean of the kept scores over 10, capped at 0.95.

use tracing::{info, warn};
use webqa_core::config::LexicalConfig;
use webqa_core::traits::Strategy;
use webqa_core::types::{AnswerResult, Ranking, ScoredCandidate, NO_RELATED_ANSWER};
use webqa_text::analyzer::{AnalyzerOptions, TermAnalyzer};
use webqa_text::keyword::{bonus_for, normalize_for_terms, QuestionType};
use webqa_text::rank::descending;
use webqa_text::{SentenceSplitter, TfIdfRanker};

pub const LEXICAL_MODEL: &str = "lexical-advanced";

const SHORT_TEXT_CONFIDENCE: f32 = 0.7;
const FALLBACK_CONFIDENCE: f32 = 0.5;
const CONFIDENCE_CAP: f32 = 0.95;
const FACTOID_CONFIDENCE: f32 = 0.8;

/// Stemmed, stop-word-free question terms and the question type.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTerms {
    pub terms: Vec<String>,
    pub question_type: Option<QuestionType>,
}

pub struct LexicalStrategy {
    config: LexicalConfig,
    terms: TermAnalyzer,
    tfidf: TfIdfRanker,
}

impl LexicalStrategy {
    pub fn new(config: LexicalConfig) -> Self {
        Self {
            config,
            terms: TermAnalyzer::new(AnalyzerOptions { remove_stop_words: true, stem: true }),
            tfidf: TfIdfRanker::new(false),
        }
    }

    fn sentence_terms(&self, text: &str) -> Vec<String> { self.terms.terms(&normalize_for_terms(text)) }

    pub fn key_terms(&self, question: &str) -> KeyTerms {
        let normalized = normalize_for_terms(question);
        let terms = self
            .terms
            .terms(&normalized)
            .into_iter()
            .filter(|t| !QuestionType::WORDS.contains(&t.as_str()))
            .collect();
        KeyTerms { terms, question_type: QuestionType::detect(&normalized) }
    }

    fn keyword_score(&self, key: &KeyTerms, sentence: &str) -> f32 {
        let tokens = self.sentence_terms(sentence);
        let matches = key.terms.iter().filter(|t| tokens.contains(t)).count();
        let length_adjust = match tokens.len() {
            5..=25 => 1.0,
            n if n > 25 => -1.0,
            _ => 0.0,
        };
        2.0 * matches as f32 + length_adjust + bonus_for(key.question_type, sentence)
    }

    /// Rank sentences by keyword score plus weighted TF-IDF similarity and
    /// keep the best `top_sentences`. Without a TF-IDF vocabulary the
    /// keyword ranking stands alone as a [`Ranking::Fallback`].
    pub fn rank_sentences(&self, question: &str, key: &KeyTerms, sentences: &[String]) -> Ranking {
        let mut scored: Vec<ScoredCandidate> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| ScoredCandidate::new(i, s.as_str(), self.keyword_score(key, s)))
            .collect();
        scored.sort_by(|a, b| descending(a.score, b.score));

        let texts: Vec<&str> = scored.iter().map(|c| c.text.as_str()).collect();
        match self.tfidf.similarities(question, &texts) {
            Some(sims) => {
                for (candidate, sim) in scored.iter_mut().zip(sims) {
                    candidate.score += sim * self.config.tfidf_weight;
                }
                scored.sort_by(|a, b| descending(a.score, b.score));
                scored.truncate(self.config.top_sentences);
                Ranking::Scored(scored)
            }
            None => {
                warn!("TF-IDF failed on sentences, keeping keyword scores");
                scored.truncate(self.config.top_sentences);
                Ranking::Fallback { candidates: scored, reason: "empty vocabulary".to_string() }
            }
        }
    }

    /// Relevant sentences and the chunk-level confidence.
    pub fn relevant_sentences(&self, question: &str, content: &str) -> (Vec<String>, f32) {
        let sentences: Vec<String> = SentenceSplitter::Punctuation
            .split(content, self.config.min_sentence_chars)
            .into_iter()
            .map(|s| s.text)
            .collect();
        if sentences.is_empty() {
            return (Vec::new(), 0.0);
        }
        if sentences.len() <= self.config.short_text_sentences {
            return (sentences, SHORT_TEXT_CONFIDENCE);
        }
        let key = self.key_terms(question);
        match self.rank_sentences(question, &key, &sentences) {
            Ranking::Scored(top) => {
                let mean = top.iter().map(|c| c.score).sum::<f32>() / top.len().max(1) as f32;
                (top.into_iter().map(|c| c.text).collect(), (mean / 10.0).min(CONFIDENCE_CAP))
            }
            Ranking::Fallback { candidates, .. } => {
                (candidates.into_iter().map(|c| c.text).collect(), FALLBACK_CONFIDENCE)
            }
        }
    }

    /// Pick the answer among the relevant sentences. The returned confidence
    /// is the extraction score only.
    pub fn extract(&self, key: &KeyTerms, relevant: &[String]) -> AnswerResult {
        if relevant.is_empty() {
            return AnswerResult::not_found(NO_RELATED_ANSWER);
        }
        let context = relevant.join(" ");
        if key.question_type.is_some_and(QuestionType::is_factoid) {
            let needed = key.terms.len() as f32 * 0.5;
            let shortest = relevant
                .iter()
                .filter(|s| {
                    let tokens = self.sentence_terms(s);
                    key.terms.iter().filter(|t| tokens.contains(t)).count() as f32 >= needed
                })
                .min_by_key(|s| s.chars().count());
            if let Some(answer) = shortest {
                return AnswerResult::new(answer.as_str(), FACTOID_CONFIDENCE, context);
            }
        }
        let answer = relevant.iter().take(2).cloned().collect::<Vec<_>>().join(" ");
        let confidence = if relevant.len() >= 2 { 0.7 } else { 0.5 };
        AnswerResult::new(answer, confidence, context)
    }
}

impl Strategy for LexicalStrategy {
    fn name(&self) -> &str { LEXICAL_MODEL }

    fn answer_question(&self, question: &str, content: &str) -> AnswerResult {
        info!("Answering question using lexical ranking: {}", question);
        if question.is_empty() || content.is_empty() {
            return AnswerResult::no_content();
        }
        let (relevant, chunk_confidence) = self.relevant_sentences(question, content);
        let key = self.key_terms(question);
        self.extract(&key, &relevant).blend(chunk_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> LexicalStrategy { LexicalStrategy::new(LexicalConfig::default()) }

    #[test]
    fn key_terms_are_stemmed_without_wh_words() {
        let key = strategy().key_terms("Who created the programming languages?");
        assert_eq!(key.question_type, Some(QuestionType::Who));
        assert_eq!(key.terms, vec!["creat", "program", "languag"]);
    }

    #[test]
    fn factoid_prefers_shortest_matching_sentence() {
        let s = strategy();
        let key = s.key_terms("Who created Rust?");
        let relevant = vec![
            "Rust was created by Graydon Hoare at Mozilla Research in 2006.".to_string(),
            "Graydon Hoare created Rust.".to_string(),
            "Cargo is its build tool.".to_string(),
        ];
        let r = s.extract(&key, &relevant);
        assert_eq!(r.answer, "Graydon Hoare created Rust.");
        assert_eq!(r.confidence, FACTOID_CONFIDENCE);
        assert_eq!(r.context, relevant.join(" "));
    }

    #[test]
    fn explanatory_questions_take_two_sentences() {
        let s = strategy();
        let key = s.key_terms("Why is Rust fast?");
        let r = s.extract(&key, &["Zero cost abstractions.".to_string(), "No garbage collector.".to_string()]);
        assert_eq!(r.answer, "Zero cost abstractions. No garbage collector.");
        assert_eq!(r.confidence, 0.7);
        assert_eq!(s.extract(&key, &[]).as_tuple(), (NO_RELATED_ANSWER, 0.1, ""));
    }

    #[test]
    fn short_texts_keep_every_sentence() {
        let (sentences, confidence) =
            strategy().relevant_sentences("What is Rust?", "Rust is a language. It is fast and safe.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(confidence, SHORT_TEXT_CONFIDENCE);
    }

    #[test]
    fn long_texts_are_ranked_and_capped() {
        let mut content = String::new();
        for i in 0..12 {
            content.push_str(&format!("Filler sentence number {i} talks about gardening. "));
        }
        content.push_str("The borrow checker enforces ownership rules in Rust.");
        let s = strategy();
        let (top, confidence) = s.relevant_sentences("What does the borrow checker enforce?", &content);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], "The borrow checker enforces ownership rules in Rust.");
        assert!(confidence > 0.0 && confidence <= CONFIDENCE_CAP);
    }
}
