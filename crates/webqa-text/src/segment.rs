//! Greedy, order-preserving chunking.
//!
//! Units (sentences or paragraphs) are appended to the open chunk while its
//! measured size stays within the bound. A unit that does not fit seals the
//! chunk and opens the next one; a unit larger than the bound on its own is
//! placed alone, untruncated.

use webqa_core::types::{Chunk, Sentence};

use crate::sentences::SentenceSplitter;

/// How a unit's size counts against a chunk bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Chars,
    Words,
    /// Every unit counts as one, so the bound is a unit count.
    Units,
}

impl Measure {
    pub fn size(self, unit: &str) -> usize {
        match self {
            Self::Chars => unit.chars().count(),
            Self::Words => unit.split_whitespace().count(),
            Self::Units => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyPacker {
    pub bound: usize,
    pub measure: Measure,
}

impl GreedyPacker {
    pub fn new(bound: usize, measure: Measure) -> Self { Self { bound, measure } }

    pub fn pack<S: AsRef<str>>(&self, units: &[S]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_size = 0usize;
        for unit in units {
            let unit = unit.as_ref();
            let size = self.measure.size(unit);
            if !current.is_empty() && current_size + size > self.bound {
                chunks.push(Chunk { index: chunks.len(), units: std::mem::take(&mut current), size: current_size });
                current_size = 0;
            }
            current.push(unit.to_string());
            current_size += size;
        }
        if !current.is_empty() {
            chunks.push(Chunk { index: chunks.len(), units: current, size: current_size });
        }
        chunks
    }
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_whitespace(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }

/// Blank-line separated paragraphs, whitespace-collapsed, empties dropped.
pub fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n").map(collapse_whitespace).filter(|p| !p.is_empty()).collect()
}

/// Sentence splitting plus greedy packing, configured per strategy.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    pub splitter: SentenceSplitter,
    /// Sentences with fewer characters are dropped as noise.
    pub min_sentence_chars: usize,
    pub packer: GreedyPacker,
}

impl Segmenter {
    pub fn new(splitter: SentenceSplitter, min_sentence_chars: usize, packer: GreedyPacker) -> Self {
        Self { splitter, min_sentence_chars, packer }
    }

    pub fn to_sentences(&self, text: &str) -> Vec<Sentence> { self.splitter.split(text, self.min_sentence_chars) }

    /// Zero usable sentences gives an empty vector.
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        let sentences: Vec<String> = self.to_sentences(text).into_iter().map(|s| s.text).collect();
        self.packer.pack(&sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_up_to_the_bound() {
        let packer = GreedyPacker::new(10, Measure::Chars);
        let chunks = packer.pack(&["aaaa", "bbbb", "cc", "dddddd"]);
        let units: Vec<Vec<String>> = chunks.iter().map(|c| c.units.clone()).collect();
        assert_eq!(units, vec![vec!["aaaa", "bbbb", "cc"], vec!["dddddd"]]);
        assert_eq!(chunks[0].size, 10);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn over_long_unit_stands_alone() {
        let packer = GreedyPacker::new(3, Measure::Words);
        let chunks = packer.pack(&["one two", "a b c d e f", "x"]);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].units, vec!["a b c d e f"]);
        assert_eq!(chunks[1].size, 6);
    }

    #[test]
    fn unit_measure_counts_sentences() {
        let packer = GreedyPacker::new(2, Measure::Units);
        let chunks = packer.pack(&["s1", "s2", "s3", "s4", "s5"]);
        assert_eq!(chunks.iter().map(|c| c.units.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "First  para\nline two.\n\n\n\nSecond para.\n\n   \n\nThird.";
        assert_eq!(paragraphs(text), vec!["First para line two.", "Second para.", "Third."]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let seg = Segmenter::new(SentenceSplitter::Heuristic, 11, GreedyPacker::new(3, Measure::Units));
        assert!(seg.segment("").is_empty());
        assert!(seg.segment("Tiny. Bits.").is_empty());
    }
}
