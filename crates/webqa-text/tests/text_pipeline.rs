use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use webqa_core::store::ContentStore;
use webqa_core::traits::ContentExtractor;
use webqa_core::Error;
use webqa_text::segment::paragraphs;
use webqa_text::{ContentProcessor, Corpus, FileExtractor, GreedyPacker, Measure, Segmenter, SentenceSplitter};

/// Serves canned pages; any other URL fails like an unreachable host.
struct CannedExtractor(HashMap<&'static str, &'static str>);

impl ContentExtractor for CannedExtractor {
    fn extract(&self, url: &str) -> webqa_core::Result<String> {
        self.0.get(url).map(|s| s.to_string()).ok_or_else(|| Error::acquisition(url, "connection refused"))
    }
}

fn corpus() -> Corpus {
    let pages = HashMap::from([
        ("https://a.example", "## Alpha\n\nAlpha page talks about **ownership**."),
        ("https://b.example", "Beta page covers [borrowing](https://b.example/borrow)."),
    ]);
    Corpus::new(Arc::new(ContentStore::new()), Arc::new(CannedExtractor(pages)), ContentProcessor::default())
}

#[test]
fn ingest_concatenates_in_order_and_reports_failures() {
    let corpus = corpus();
    let report = corpus.ingest(&["https://a.example", "https://down.example", "https://b.example"]);

    assert_eq!(
        report.combined,
        "\n\n--- Content from https://a.example ---\n\nAlpha Alpha page talks about ownership.\
         \n\n--- Content from https://b.example ---\n\nBeta page covers borrowing."
    );
    assert_eq!(report.url_count, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, "https://down.example");
    assert!(report.summary.contains("Alpha page talks about ownership."));
    assert_eq!(corpus.store().len(), 2);
}

#[test]
fn combined_content_uses_cache_then_extracts_on_miss() {
    let corpus = corpus();
    let combined = corpus.combined_content(&["https://b.example", "https://a.example"]);
    assert_eq!(combined, "\n\nBeta page covers borrowing.\n\nAlpha Alpha page talks about ownership.");
    assert_eq!(corpus.store().len(), 2, "on-the-fly extraction populates the cache");

    corpus.store().insert("https://b.example", "Edited beta.");
    let combined = corpus.combined_content(&["https://a.example", "https://b.example", "https://c.example"]);
    let a = combined.find("Alpha").unwrap();
    let b = combined.find("Edited beta.").unwrap();
    assert!(a < b);
    assert!(corpus.cached("https://c.example").is_err());
}

#[test]
fn chunks_reconstruct_the_sentence_sequence() {
    let text = "Rust is a systems language. It has no garbage collector. Ok. Memory safety comes from ownership. \
                Borrowing lets code use values without taking them. Lifetimes describe how long references live.";
    let segmenter = Segmenter::new(SentenceSplitter::Punctuation, 5, GreedyPacker::new(80, Measure::Chars));
    let sentences: Vec<String> = segmenter.to_sentences(text).into_iter().map(|s| s.text).collect();
    let chunks = segmenter.segment(text);

    assert!(chunks.len() > 1);
    assert!(!sentences.iter().any(|s| s == "Ok."), "noise is filtered before packing");
    let flattened: Vec<String> = chunks.iter().flat_map(|c| c.units.clone()).collect();
    assert_eq!(flattened, sentences);
    for chunk in &chunks {
        assert!(chunk.size <= 80 || chunk.units.len() == 1);
    }
}

#[test]
fn file_extractor_feeds_paragraph_packing() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("guide.md");
    fs::write(&path, "First paragraph here.\n\nSecond paragraph\nspans lines.\n\nThird.")?;
    let raw = FileExtractor::new().extract(&path.display().to_string())?;
    let paras = paragraphs(&raw);
    assert_eq!(paras, vec!["# guide", "First paragraph here.", "Second paragraph spans lines.", "Third."]);

    let chunks = GreedyPacker::new(5, Measure::Words).pack(&paras);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].units, vec!["Second paragraph spans lines.", "Third."]);
    assert_eq!(chunks[1].size, 5);
    Ok(())
}
