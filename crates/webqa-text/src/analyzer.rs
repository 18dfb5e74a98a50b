//! Tantivy text-analysis pipelines used for lexical matching.
//!
//! Term extraction runs through `SimpleTokenizer -> LowerCaser ->
//! StopWordFilter [-> Stemmer]`, the same chain a full-text index would use,
//! so "created" in a question meets "created" in content regardless of case
//! or surrounding punctuation.

use std::collections::HashSet;
use std::sync::LazyLock;

use tantivy::tokenizer::{Language, LowerCaser, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer, TokenStream};

pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can", "could", "did", "do",
    "does", "doing", "down", "during", "each", "either", "else", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must", "my", "myself", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "shall", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "us", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "whose", "why",
    "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Case-insensitive stop-word check.
pub fn is_stop_word(word: &str) -> bool {
    if word.chars().any(char::is_uppercase) {
        STOP_WORD_SET.contains(word.to_lowercase().as_str())
    } else {
        STOP_WORD_SET.contains(word)
    }
}

/// Which filters the term pipeline applies after lowercasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalyzerOptions {
    pub remove_stop_words: bool,
    pub stem: bool,
}

pub fn build_analyzer(options: AnalyzerOptions) -> TextAnalyzer {
    let stop_words = || StopWordFilter::remove(STOP_WORDS.iter().map(|s| (*s).to_string()));
    let base = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser);
    match (options.remove_stop_words, options.stem) {
        (true, true) => base.filter(stop_words()).filter(Stemmer::new(Language::English)).build(),
        (true, false) => base.filter(stop_words()).build(),
        (false, true) => base.filter(Stemmer::new(Language::English)).build(),
        (false, false) => base.build(),
    }
}

/// A reusable term extractor. Each call works on its own clone of the
/// analyzer, so a shared `TermAnalyzer` needs no locking.
#[derive(Clone)]
pub struct TermAnalyzer {
    analyzer: TextAnalyzer,
    min_term_chars: usize,
}

impl TermAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self { Self { analyzer: build_analyzer(options), min_term_chars: 1 } }

    /// Drop terms shorter than `n` characters.
    pub fn with_min_term_chars(mut self, n: usize) -> Self {
        self.min_term_chars = n;
        self
    }

    pub fn terms(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            let token = stream.token();
            if token.text.chars().count() >= self.min_term_chars {
                out.push(token.text.clone());
            }
        }
        out
    }
}

impl std::fmt::Debug for TermAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermAnalyzer").field("min_term_chars", &self.min_term_chars).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_and_case_are_removed() {
        let a = TermAnalyzer::new(AnalyzerOptions { remove_stop_words: true, stem: false });
        assert_eq!(a.terms("Who created the Claude assistant?"), vec!["created", "claude", "assistant"]);
    }

    #[test]
    fn stemming_folds_inflections() {
        let a = TermAnalyzer::new(AnalyzerOptions { remove_stop_words: true, stem: true });
        assert_eq!(a.terms("running"), a.terms("runs"));
    }

    #[test]
    fn min_term_chars_filters_short_tokens() {
        let a = TermAnalyzer::new(AnalyzerOptions::default()).with_min_term_chars(2);
        assert_eq!(a.terms("a bc d ef"), vec!["bc", "ef"]);
    }

    #[test]
    fn stop_word_check_ignores_case() {
        assert!(is_stop_word("The"));
        assert!(!is_stop_word("Anthropic"));
    }
}
