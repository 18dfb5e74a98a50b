//! A small rule-based [`LinguisticAnalyzer`].
//!
//! Entities are runs of capitalized non-stop words (or digit runs). Roles are
//! guessed from neighbouring function words: a noun after a preposition is a
//! prepositional object, the first content word is the subject, and a later
//! content word after a determiner or at the end of the clause is the object.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use webqa_core::traits::{DependencyRole, EntitySpan, LexToken, LinguisticAnalyzer};

use crate::analyzer::is_stop_word;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:['\u{2019}]\w+)*|[^\w\s]").expect("token regex is valid"));

static PREPOSITIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "in", "on", "at", "by", "for", "with", "from", "to", "of", "about", "into", "over", "under", "after", "before",
        "during", "through", "near", "between", "across", "behind", "within", "without",
    ]
    .into_iter()
    .collect()
});

static DETERMINERS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["the", "a", "an", "this", "that", "these", "those", "his", "her", "its", "their", "our", "my", "your"]
        .into_iter()
        .collect()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnalyzer;

impl RuleBasedAnalyzer {
    pub fn new() -> Self { Self }
}

fn is_content(token: &LexToken) -> bool { token.is_alpha && !token.is_stop }

fn looks_like_verb(word: &str) -> bool { word.len() > 4 && (word.ends_with("ed") || word.ends_with("ing")) }

impl LinguisticAnalyzer for RuleBasedAnalyzer {
    fn tokenize(&self, text: &str) -> Vec<LexToken> {
        TOKEN_RE
            .find_iter(text)
            .map(|m| {
                let word = m.as_str();
                LexToken {
                    text: word.to_string(),
                    offset: m.start(),
                    is_alpha: word.chars().all(char::is_alphabetic),
                    is_stop: is_stop_word(word),
                }
            })
            .collect()
    }

    fn entities(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = self.tokenize(text);
        let mut spans: Vec<EntitySpan> = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for token in &tokens {
            let capitalized = is_content(token) && token.text.chars().next().is_some_and(char::is_uppercase);
            let numeric = token.text.chars().all(|c| c.is_ascii_digit());
            let end = token.offset + token.text.len();
            if capitalized || numeric {
                run = match run {
                    Some((start, prev_end)) if text[prev_end..token.offset].trim().is_empty() => Some((start, end)),
                    Some(done) => {
                        spans.push(span(text, done));
                        Some((token.offset, end))
                    }
                    None => Some((token.offset, end)),
                };
            } else if let Some(done) = run.take() {
                spans.push(span(text, done));
            }
        }
        if let Some(done) = run {
            spans.push(span(text, done));
        }
        spans
    }

    fn dependency_role(&self, tokens: &[LexToken], index: usize) -> DependencyRole {
        let Some(token) = tokens.get(index) else { return DependencyRole::Other };
        if !is_content(token) {
            return DependencyRole::Other;
        }
        let prev = index.checked_sub(1).and_then(|i| tokens.get(i)).map(LexToken::lower);
        let prev2 = index.checked_sub(2).and_then(|i| tokens.get(i)).map(LexToken::lower);
        let earlier_content = tokens[..index].iter().any(is_content);
        let later_content = tokens[index + 1..].iter().any(is_content);

        if let Some(p) = prev.as_deref() {
            if PREPOSITIONS.contains(p) {
                return DependencyRole::PrepositionalObject;
            }
            if DETERMINERS.contains(p) {
                if prev2.as_deref().is_some_and(|w| PREPOSITIONS.contains(w)) {
                    return DependencyRole::PrepositionalObject;
                }
                return if earlier_content { DependencyRole::DirectObject } else { DependencyRole::Subject };
            }
        }
        if looks_like_verb(&token.lower()) {
            return DependencyRole::Other;
        }
        if !earlier_content {
            return DependencyRole::Subject;
        }
        if !later_content {
            return DependencyRole::DirectObject;
        }
        DependencyRole::Other
    }
}

fn span(text: &str, (start, end): (usize, usize)) -> EntitySpan {
    EntitySpan { text: text[start..end].to_string(), start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_merge_adjacent_capitalized_words() {
        let a = RuleBasedAnalyzer::new();
        let ents: Vec<String> =
            a.entities("Who founded Acme Corp in 1999, and does Claude know?").into_iter().map(|e| e.text).collect();
        assert_eq!(ents, vec!["Acme Corp", "1999", "Claude"]);
    }

    #[test]
    fn roles_follow_function_words() {
        let a = RuleBasedAnalyzer::new();
        let tokens = a.tokenize("Who created Claude?");
        let roles: Vec<DependencyRole> = (0..tokens.len()).map(|i| a.dependency_role(&tokens, i)).collect();
        assert_eq!(
            roles,
            vec![DependencyRole::Other, DependencyRole::Other, DependencyRole::DirectObject, DependencyRole::Other]
        );

        let tokens = a.tokenize("Engineers live in the city");
        assert_eq!(a.dependency_role(&tokens, 0), DependencyRole::Subject);
        assert_eq!(a.dependency_role(&tokens, 4), DependencyRole::PrepositionalObject);
    }

    #[test]
    fn tokens_carry_offsets_and_flags() {
        let tokens = RuleBasedAnalyzer::new().tokenize("It's 42!");
        assert_eq!(tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), vec!["It's", "42", "!"]);
        assert_eq!(tokens[1].offset, 5);
        assert!(!tokens[1].is_alpha);
        assert!(!tokens[0].is_alpha);
    }
}
