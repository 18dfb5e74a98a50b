//! webqa-strategies
//!
//! The interchangeable question-answering pipelines and the registry that
//! serves them by name.

pub mod default;
pub mod lexical;
pub mod rank;
pub mod registry;
pub mod semantic;
pub mod span;

/// Key of the always-available heuristic strategy.
pub const DEFAULT_MODEL: &str = "default";

pub use default::HeuristicStrategy;
pub use lexical::{LexicalStrategy, LEXICAL_MODEL};
pub use rank::EmbeddingRanker;
pub use registry::{canonical, Dispatch, ModelCatalog, ModelInfo, ModelRegistry, ServedAnswer};
pub use semantic::{SemanticStrategy, SENTENCE_TRANSFORMER_MODEL, UNIVERSAL_ENCODER_MODEL};
pub use span::{SpanStrategy, SPAN_MODEL};
