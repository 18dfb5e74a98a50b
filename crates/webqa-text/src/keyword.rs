//! Question profiling and keyword/entity scoring.
//!
//! Scores are additive and unbounded: 1.5 per question entity found in the
//! sentence, 1.0 per subject/object keyword, 0.5 per other keyword, plus the
//! question-type bonuses from [`QuestionType::bonus`]. Matching is
//! case-insensitive substring containment.
//!
//! The capitalized-word cue skips a sentence's first word, which is
//! capitalized anyway, so only names inside the sentence earn it.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use webqa_core::traits::LinguisticAnalyzer;
use webqa_core::types::{Ranking, ScoredCandidate};

use crate::rank::descending;

pub const ENTITY_WEIGHT: f32 = 1.5;
pub const ARGUMENT_WEIGHT: f32 = 1.0;
pub const KEYWORD_WEIGHT: f32 = 0.5;
pub const CAPITALIZED_BONUS: f32 = 1.0;
pub const DATE_BONUS: f32 = 1.5;
pub const LOCATION_BONUS: f32 = 1.5;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}|\bday\b|\bmonth\b|\byear\b|\bdate\b|\btime\b").expect("date regex is valid"));
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\b|\bat\b|\bnear\b|\blocation\b|\bplace\b|\bcountry\b|\bcity\b").expect("location regex is valid")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").expect("url regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    What,
    When,
    Where,
    Who,
    Why,
    How,
    Which,
}

impl QuestionType {
    const ORDER: [(&'static str, QuestionType); 7] = [
        ("what", Self::What),
        ("when", Self::When),
        ("where", Self::Where),
        ("who", Self::Who),
        ("why", Self::Why),
        ("how", Self::How),
        ("which", Self::Which),
    ];

    pub const WORDS: [&'static str; 7] = ["what", "when", "where", "who", "why", "how", "which"];

    /// First wh-word (in `what, when, where, who, why, how, which` order)
    /// that appears as a word of the question.
    pub fn detect(question: &str) -> Option<Self> {
        let lower = question.to_lowercase();
        let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        Self::ORDER.iter().find(|(w, _)| words.contains(w)).map(|(_, t)| *t)
    }

    /// Questions expecting a short fact rather than an explanation.
    pub fn is_factoid(self) -> bool { !matches!(self, Self::Why | Self::How) }

    /// Extra score a sentence earns for cues matching the question type.
    pub fn bonus(self, sentence: &str) -> f32 {
        if !matches!(self, Self::Who | Self::Where | Self::When) {
            return 0.0;
        }
        let mut bonus = 0.0;
        let capitalized = sentence.split_whitespace().skip(1).any(|w| w.chars().next().is_some_and(char::is_uppercase));
        if capitalized {
            bonus += CAPITALIZED_BONUS;
        }
        let lower = sentence.to_lowercase();
        if self == Self::When && DATE_RE.is_match(&lower) {
            bonus += DATE_BONUS;
        }
        if self == Self::Where && LOCATION_RE.is_match(&lower) {
            bonus += LOCATION_BONUS;
        }
        bonus
    }
}

pub fn bonus_for(question_type: Option<QuestionType>, sentence: &str) -> f32 {
    question_type.map_or(0.0, |t| t.bonus(sentence))
}

/// Lowercase, drop URLs and ASCII punctuation, collapse whitespace.
pub fn normalize_for_terms(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, " ");
    let cleaned: String = no_urls.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub text: String,
    /// Subject or object of the question clause.
    pub is_argument: bool,
}

/// What the heuristic scorer needs to know about a question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionProfile {
    /// Lowercased entity mentions.
    pub entities: Vec<String>,
    /// Lowercased alphabetic non-stop tokens.
    pub keywords: Vec<Keyword>,
    pub question_type: Option<QuestionType>,
}

impl QuestionProfile {
    pub fn analyze(question: &str, analyzer: &dyn LinguisticAnalyzer) -> Self {
        let tokens = analyzer.tokenize(question);
        let keywords = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_alpha && !t.is_stop)
            .map(|(i, t)| Keyword { text: t.lower(), is_argument: analyzer.dependency_role(&tokens, i).is_argument() })
            .collect();
        let entities = analyzer.entities(question).into_iter().map(|e| e.text.to_lowercase()).collect();
        Self { entities, keywords, question_type: QuestionType::detect(question) }
    }

    pub fn entity_count(&self) -> usize { self.entities.len() }

    pub fn keyword_count(&self) -> usize { self.keywords.len() }

    pub fn score(&self, sentence: &str) -> f32 {
        let lower = sentence.to_lowercase();
        let entity: f32 = self.entities.iter().filter(|e| lower.contains(e.as_str())).count() as f32 * ENTITY_WEIGHT;
        let keyword: f32 = self
            .keywords
            .iter()
            .filter(|k| lower.contains(k.text.as_str()))
            .map(|k| if k.is_argument { ARGUMENT_WEIGHT } else { KEYWORD_WEIGHT })
            .sum();
        entity + keyword + bonus_for(self.question_type, sentence)
    }

    /// Number of keywords contained in the sentence.
    pub fn keyword_hits(&self, sentence: &str) -> usize {
        let lower = sentence.to_lowercase();
        self.keywords.iter().filter(|k| lower.contains(k.text.as_str())).count()
    }
}

/// Ranks sentences by [`QuestionProfile::score`], keeping only positive scores.
#[derive(Clone)]
pub struct HeuristicRanker {
    analyzer: Arc<dyn LinguisticAnalyzer>,
}

impl HeuristicRanker {
    pub fn new(analyzer: Arc<dyn LinguisticAnalyzer>) -> Self { Self { analyzer } }

    pub fn profile(&self, question: &str) -> QuestionProfile { QuestionProfile::analyze(question, self.analyzer.as_ref()) }

    pub fn rank<S: AsRef<str>>(&self, profile: &QuestionProfile, sentences: &[S], top_k: usize) -> Ranking {
        let mut scored: Vec<ScoredCandidate> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| ScoredCandidate::new(i, s.as_ref(), profile.score(s.as_ref())))
            .filter(|c| c.score > 0.0)
            .collect();
        scored.sort_by(|a, b| descending(a.score, b.score));
        scored.truncate(top_k);
        Ranking::Scored(scored)
    }
}

impl std::fmt::Debug for HeuristicRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("HeuristicRanker") }
}
