//! Aggregation of content across source URLs.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use webqa_core::store::ContentStore;
use webqa_core::traits::ContentExtractor;
use webqa_core::{Error, Result};

use crate::processor::ContentProcessor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Every successfully processed source under a `--- Content from <url> ---` banner.
    pub combined: String,
    pub summary: String,
    pub url_count: usize,
    pub failures: Vec<IngestFailure>,
}

/// Fetches, cleans and caches source documents, and joins cached documents
/// into the content a question is answered against.
#[derive(Clone)]
pub struct Corpus {
    store: Arc<ContentStore>,
    extractor: Arc<dyn ContentExtractor>,
    processor: ContentProcessor,
    summary_sentences: usize,
}

impl Corpus {
    pub fn new(store: Arc<ContentStore>, extractor: Arc<dyn ContentExtractor>, processor: ContentProcessor) -> Self {
        Self { store, extractor, processor, summary_sentences: 5 }
    }

    pub fn with_summary_sentences(mut self, n: usize) -> Self {
        self.summary_sentences = n;
        self
    }

    pub fn store(&self) -> &Arc<ContentStore> { &self.store }

    /// Extract, clean and cache one source.
    pub fn ingest_one(&self, url: &str) -> Result<String> {
        let raw = self.extractor.extract(url)?;
        let processed = self.processor.process(&raw);
        self.store.insert(url, processed.clone());
        Ok(processed)
    }

    pub fn ingest<S: AsRef<str>>(&self, urls: &[S]) -> IngestReport { self.ingest_with(urls, |_, _| {}) }

    /// Like [`Corpus::ingest`], calling `on_progress(url, ok)` after each source.
    /// A failing source is reported and skipped; the rest still run.
    pub fn ingest_with<S, F>(&self, urls: &[S], mut on_progress: F) -> IngestReport
    where
        S: AsRef<str>,
        F: FnMut(&str, bool),
    {
        info!("Extracting content from {} URLs", urls.len());
        let mut combined = String::new();
        let mut failures = Vec::new();
        for url in urls {
            let url = url.as_ref();
            match self.ingest_one(url) {
                Ok(text) => {
                    combined.push_str(&format!("\n\n--- Content from {url} ---\n\n{text}"));
                    on_progress(url, true);
                }
                Err(e) => {
                    error!("Error processing {}: {}", url, e);
                    failures.push(IngestFailure { url: url.to_string(), error: e.to_string() });
                    on_progress(url, false);
                }
            }
        }
        let summary = self.processor.summarize(&combined, self.summary_sentences);
        IngestReport { combined, summary, url_count: urls.len(), failures }
    }

    /// Cached documents for `urls` joined in order, each preceded by a blank
    /// line. When none of them is cached, sources are extracted now and cached;
    /// sources that fail are logged and left out.
    pub fn combined_content<S: AsRef<str>>(&self, urls: &[S]) -> String {
        let mut combined = String::new();
        for url in urls {
            let url = url.as_ref();
            match self.store.get(url) {
                Some(text) => combined.push_str(&format!("\n\n{text}")),
                None => warn!("Content for {} not found in cache", url),
            }
        }
        if !combined.is_empty() {
            return combined;
        }
        for url in urls {
            let url = url.as_ref();
            match self.ingest_one(url) {
                Ok(text) => combined.push_str(&format!("\n\n{text}")),
                Err(e) => error!("Error extracting content from {}: {}", url, e),
            }
        }
        combined
    }

    /// The cached document for one source.
    pub fn cached(&self, url: &str) -> Result<String> {
        self.store.get(url).ok_or_else(|| Error::NotFound(url.to_string()))
    }
}

impl std::fmt::Debug for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Corpus").field("cached", &self.store.len()).finish_non_exhaustive()
    }
}
