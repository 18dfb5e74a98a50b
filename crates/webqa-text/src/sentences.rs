//! Sentence boundary detection.
//!
//! Two splitters are provided:
//! - [`SentenceSplitter::Punctuation`]: English-aware rules (abbreviations,
//!   initials, decimals, lowercase continuations) used by the lexical strategies.
//! - [`SentenceSplitter::Heuristic`]: split on a whitespace character preceded
//!   by `.`, `?` or `!`, unless the text before it looks like `x.y.` or `Ab.`.
//!   Used by the embedding strategies.

use std::collections::HashSet;
use std::sync::LazyLock;

use webqa_core::types::Sentence;

static ABBREVIATIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "inc", "ltd", "co", "corp", "no", "fig",
        "approx", "dept", "est", "gen", "gov", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct",
        "nov", "dec", "e.g", "i.e", "u.s", "u.k", "a.m", "p.m",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceSplitter {
    Punctuation,
    Heuristic,
}

impl SentenceSplitter {
    /// Split `text` and keep trimmed sentences of at least `min_chars` characters.
    pub fn split(self, text: &str, min_chars: usize) -> Vec<Sentence> {
        let raw = match self {
            Self::Punctuation => split_punctuation(text),
            Self::Heuristic => split_heuristic(text),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s.chars().count() >= min_chars)
            .enumerate()
            .map(|(index, text)| Sentence { index, text })
            .collect()
    }
}

fn is_terminal(c: char) -> bool { matches!(c, '.' | '?' | '!') }

fn is_closer(c: char) -> bool { matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}') }

fn is_word(c: char) -> bool { c.is_alphanumeric() || c == '_' }

/// English-aware splitting. A terminal mark (plus any closing quotes or
/// brackets) ends a sentence when it is followed by whitespace and the next
/// word does not start in lowercase, unless the word before a period is a
/// known abbreviation, a single-letter initial, or the period sits inside a
/// number.
pub fn split_punctuation(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < chars.len() {
        let (_, c) = chars[i];
        if !is_terminal(c) {
            i += 1;
            continue;
        }
        let mut end = i + 1;
        while end < chars.len() && (is_terminal(chars[end].1) || is_closer(chars[end].1)) {
            end += 1;
        }
        if end < chars.len() && !chars[end].1.is_whitespace() {
            i = end;
            continue;
        }
        let mut next = end;
        while next < chars.len() && chars[next].1.is_whitespace() {
            next += 1;
        }
        let boundary_byte = chars.get(end).map_or(text.len(), |(b, _)| *b);
        let split = next >= chars.len()
            || (!chars[next].1.is_lowercase() && !(c == '.' && protects_period(&text[chars[start].0..chars[i].0])));
        if split {
            out.push(text[chars[start].0..boundary_byte].to_string());
            start = next;
        }
        i = next.max(end);
    }
    if start < chars.len() {
        out.push(text[chars[start].0..].to_string());
    }
    out
}

/// True when the period right after `before` does not end a sentence.
fn protects_period(before: &str) -> bool {
    let word = before.rsplit(char::is_whitespace).next().unwrap_or("");
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    let lower = word.to_lowercase();
    if ABBREVIATIONS.contains(lower.as_str()) {
        return true;
    }
    let mut letters = word.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        if first.is_uppercase() {
            return true;
        }
    }
    word.contains('.') && word.len() <= 5
}

/// Whitespace-after-terminal splitting with the `x.y.` and `Ab.` guards.
pub fn split_heuristic(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut start_byte = 0usize;
    for i in 1..chars.len() {
        let (byte, c) = chars[i];
        if !c.is_whitespace() || !is_terminal(chars[i - 1].1) {
            continue;
        }
        let dotted = i >= 4 && is_word(chars[i - 4].1) && chars[i - 3].1 == '.' && is_word(chars[i - 2].1);
        let titled = i >= 3
            && chars[i - 3].1.is_ascii_uppercase()
            && chars[i - 2].1.is_ascii_lowercase()
            && chars[i - 1].1 == '.';
        if dotted || titled {
            continue;
        }
        out.push(text[start_byte..byte].to_string());
        start_byte = byte + c.len_utf8();
    }
    out.push(text[start_byte..].to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: Vec<Sentence>) -> Vec<String> { sentences.into_iter().map(|s| s.text).collect() }

    #[test]
    fn punctuation_splitter_respects_abbreviations() {
        let text = "Dr. Smith met Mr. J. Doe at 3.5 p.m. on Monday. They talked! Did it help? Yes.";
        assert_eq!(
            split_punctuation(text),
            vec!["Dr. Smith met Mr. J. Doe at 3.5 p.m. on Monday.", "They talked!", "Did it help?", "Yes."]
        );
    }

    #[test]
    fn punctuation_splitter_keeps_closing_quotes() {
        let text = "He said \"stop.\" Then he left.";
        assert_eq!(split_punctuation(text), vec!["He said \"stop.\"", "Then he left."]);
    }

    #[test]
    fn lowercase_continuation_is_not_a_boundary() {
        assert_eq!(split_punctuation("Version 2. was released later."), vec!["Version 2. was released later."]);
    }

    #[test]
    fn heuristic_splitter_guards_initials_and_titles() {
        let text = "Claude is an AI assistant created by Anthropic. It was designed to be helpful, harmless, and honest.";
        assert_eq!(
            split_heuristic(text),
            vec![
                "Claude is an AI assistant created by Anthropic.",
                "It was designed to be helpful, harmless, and honest."
            ]
        );
        assert_eq!(split_heuristic("See the U.S. office. Ask Mr. Brown."), vec!["See the U.S. office.", "Ask Mr. Brown."]);
    }

    #[test]
    fn min_chars_drops_noise() {
        let s = SentenceSplitter::Heuristic.split("Go on. This sentence is long enough. Fine.", 11);
        assert_eq!(texts(s), vec!["This sentence is long enough."]);
        let s = SentenceSplitter::Punctuation.split("", 5);
        assert!(s.is_empty());
    }

    #[test]
    fn indices_follow_kept_sentences() {
        let s = SentenceSplitter::Punctuation.split("Hi. Second sentence here. Third sentence here.", 5);
        assert_eq!(s.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1]);
    }
}
