//! Cleanup of extracted page text before it is cached.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::sentences::SentenceSplitter;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#{2,}").expect("valid regex"));
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*|\*").expect("valid regex"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").expect("valid regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));
static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```[^`]*```").expect("valid regex"));
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));
static SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[^\w\s.,;:\-'"?!]"#).expect("valid regex"));

const ELLIPSIS: &str = "...";

/// Turns markdown-ish extracted text into plain prose and produces short
/// summaries. Both operations are pure and accept empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentProcessor {
    pub max_summary_chars: usize,
}

impl Default for ContentProcessor {
    fn default() -> Self { Self { max_summary_chars: 500 } }
}

impl ContentProcessor {
    pub fn new(max_summary_chars: usize) -> Self { Self { max_summary_chars } }

    pub fn process(&self, raw: &str) -> String {
        debug!(chars = raw.len(), "processing content");
        let text = WHITESPACE.replace_all(raw, " ");
        let text = HEADING.replace_all(&text, "");
        let text = IMAGE.replace_all(&text, "");
        let text = EMPHASIS.replace_all(&text, "");
        let text = LINK.replace_all(&text, "$1");
        let text = CODE_BLOCK.replace_all(&text, "");
        let text = URL.replace_all(&text, "");
        let text = SPECIAL.replace_all(&text, " ");
        WHITESPACE.replace_all(&text, " ").trim().to_string()
    }

    /// The first `max_sentences` sentences, cut to `max_summary_chars`
    /// (ending in `...`) when longer.
    pub fn summarize(&self, text: &str, max_sentences: usize) -> String {
        let summary = SentenceSplitter::Punctuation
            .split(text, 1)
            .into_iter()
            .take(max_sentences)
            .map(|s| s.text)
            .collect::<Vec<_>>()
            .join(" ");
        if summary.chars().count() <= self.max_summary_chars {
            return summary;
        }
        let keep = self.max_summary_chars.saturating_sub(ELLIPSIS.len());
        let mut cut: String = summary.chars().take(keep).collect();
        cut.push_str(ELLIPSIS);
        cut
    }
}
