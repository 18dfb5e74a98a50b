//! Shared vocabulary of the question-answering workspace: value types,
//! capability traits, configuration and the per-process content store.

pub mod config;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{AnswerResult, Chunk, Ranking, ScoredCandidate, Sentence};
