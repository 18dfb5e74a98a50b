//! webqa-text
//!
//! Lexical building blocks: sentence splitting, greedy chunking, TF-IDF and
//! keyword/entity ranking, content cleanup, and the corpus that fetches and
//! caches source documents.

pub mod analyzer;
pub mod corpus;
pub mod extract;
pub mod keyword;
pub mod linguistic;
pub mod processor;
pub mod rank;
pub mod segment;
pub mod sentences;
pub mod tfidf;

pub use corpus::{Corpus, IngestFailure, IngestReport};
pub use extract::{discover_files, FileExtractor};
pub use keyword::{HeuristicRanker, QuestionProfile, QuestionType};
pub use linguistic::RuleBasedAnalyzer;
pub use processor::ContentProcessor;
pub use segment::{GreedyPacker, Measure, Segmenter};
pub use sentences::SentenceSplitter;
pub use tfidf::TfIdfRanker;
