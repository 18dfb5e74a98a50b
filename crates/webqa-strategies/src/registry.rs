//! Named strategies, their availability, and dispatch with fallback to the
//! default strategy.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use webqa_core::config::AppConfig;
use webqa_core::traits::{Embedder, SpanModel, Strategy};
use webqa_core::{AnswerResult, Error};
use webqa_embed::{get_default_embedder, load_span_model};
use webqa_text::RuleBasedAnalyzer;

use crate::default::HeuristicStrategy;
use crate::lexical::{LexicalStrategy, LEXICAL_MODEL};
use crate::semantic::{SemanticStrategy, SENTENCE_TRANSFORMER_MODEL, UNIVERSAL_ENCODER_MODEL};
use crate::span::{SpanStrategy, SPAN_MODEL};
use crate::DEFAULT_MODEL;

/// Legacy names still accepted by [`ModelRegistry::get`].
const ALIASES: [(&str, &str); 2] = [("nltk-advanced", LEXICAL_MODEL), ("tensorflow", UNIVERSAL_ENCODER_MODEL)];

/// Canonical key for a requested model name.
pub fn canonical(name: &str) -> &str {
    ALIASES.iter().find(|(alias, _)| *alias == name).map_or(name, |&(_, key)| key)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(rename = "name")]
    pub display_name: String,
    pub description: String,
    pub available: bool,
    /// Why initialization failed, for unavailable models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub models: BTreeMap<String, ModelInfo>,
    pub default: String,
}

/// The strategy that will serve a request.
#[derive(Clone)]
pub struct Dispatch {
    pub strategy: Arc<dyn Strategy>,
    pub model_used: String,
    /// The requested model was unknown or unavailable.
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServedAnswer {
    pub answer: String,
    pub confidence: f32,
    pub context: String,
    pub model_used: String,
    pub fell_back: bool,
}

impl ServedAnswer {
    fn new(result: AnswerResult, model_used: String, fell_back: bool) -> Self {
        let AnswerResult { answer, confidence, context } = result;
        Self { answer, confidence, context, model_used, fell_back }
    }
}

fn with_embedder(
    embedder: &Result<Arc<dyn Embedder>, String>,
    build: impl FnOnce(Arc<dyn Embedder>) -> SemanticStrategy,
) -> anyhow::Result<Arc<dyn Strategy>> {
    match embedder {
        Ok(e) => Ok(Arc::new(build(e.clone()))),
        Err(msg) => Err(anyhow::anyhow!("{msg}")),
    }
}

struct Entry {
    display_name: String,
    description: String,
    strategy: Result<Arc<dyn Strategy>, String>,
}

impl Entry {
    fn available(&self) -> Option<&Arc<dyn Strategy>> {
        self.strategy.as_ref().ok().filter(|s| s.is_available())
    }
}

pub struct ModelRegistry {
    entries: BTreeMap<String, Entry>,
    default: Arc<dyn Strategy>,
}

impl ModelRegistry {
    /// A registry holding only the default strategy.
    pub fn new(default: Arc<dyn Strategy>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            DEFAULT_MODEL.to_string(),
            Entry {
                display_name: "TF-IDF + Heuristics".to_string(),
                description: "Lightweight model using TF-IDF and keyword heuristics for efficient question answering"
                    .to_string(),
                strategy: Ok(default.clone()),
            },
        );
        Self { entries, default }
    }

    /// Record a strategy or the reason it could not be initialized. A failed
    /// strategy stays listed but unavailable.
    pub fn register(
        &mut self,
        key: &str,
        display_name: &str,
        description: &str,
        strategy: anyhow::Result<Arc<dyn Strategy>>,
    ) -> &mut Self {
        let strategy = strategy.map_err(|e| {
            let err = Error::initialization(key, format!("{e:#}"));
            error!("{}", err);
            err.to_string()
        });
        if strategy.is_ok() {
            info!("{} model initialized", key);
        }
        self.entries.insert(
            key.to_string(),
            Entry { display_name: display_name.to_string(), description: description.to_string(), strategy },
        );
        self
    }

    /// Every strategy the config describes. Model loading failures only
    /// disable the strategies that need the model.
    pub fn build(config: &AppConfig) -> Self {
        let analyzer = Arc::new(RuleBasedAnalyzer::new());
        let mut registry = Self::new(Arc::new(HeuristicStrategy::new(config.default.clone(), analyzer)));

        registry.register(
            LEXICAL_MODEL,
            "Lexical Advanced",
            "Stemmed key terms and TF-IDF with advanced text processing and minimal resource requirements",
            Ok(Arc::new(LexicalStrategy::new(config.lexical.clone()))),
        );

        let span = load_span_model(config).map(|model| {
            let model: Arc<dyn SpanModel> = Arc::new(model);
            Arc::new(SpanStrategy::new(model, config.distilbert.clone())) as Arc<dyn Strategy>
        });
        registry.register(
            SPAN_MODEL,
            "DistilBERT",
            "DistilBERT fine-tuned for extractive question answering (resource intensive)",
            span,
        );

        // both embedding strategies share one encoder
        let embedder: Result<Arc<dyn Embedder>, String> =
            get_default_embedder(config).map(Arc::from).map_err(|e| format!("{e:#}"));
        registry.register(
            UNIVERSAL_ENCODER_MODEL,
            "Universal Sentence Encoder",
            "Semantic model ranking three-sentence chunks by embedding similarity (medium resource usage)",
            with_embedder(&embedder, |e| SemanticStrategy::universal_encoder(config.universal_encoder.clone(), e)),
        );
        registry.register(
            SENTENCE_TRANSFORMER_MODEL,
            "Sentence Transformer",
            "Efficient semantic search using sentence embeddings (moderate resource usage, high accuracy)",
            with_embedder(&embedder, |e| SemanticStrategy::sentence_transformer(config.sentence_transformer.clone(), e)),
        );
        registry
    }

    /// The requested strategy when available, otherwise the default.
    pub fn get(&self, requested: &str) -> Dispatch {
        let key = canonical(requested);
        match self.entries.get(key).and_then(Entry::available) {
            Some(strategy) => Dispatch { strategy: strategy.clone(), model_used: key.to_string(), fell_back: false },
            None => {
                if key != DEFAULT_MODEL {
                    warn!("{} model requested but not available, falling back to default model", requested);
                }
                Dispatch {
                    strategy: self.default.clone(),
                    model_used: DEFAULT_MODEL.to_string(),
                    fell_back: key != DEFAULT_MODEL,
                }
            }
        }
    }

    pub fn is_available(&self, requested: &str) -> bool {
        self.entries.get(canonical(requested)).and_then(Entry::available).is_some()
    }

    pub fn list_models(&self) -> ModelCatalog {
        let models = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let info = ModelInfo {
                    display_name: entry.display_name.clone(),
                    description: entry.description.clone(),
                    available: entry.available().is_some(),
                    reason: entry.strategy.as_ref().err().cloned(),
                };
                (key.clone(), info)
            })
            .collect();
        ModelCatalog { models, default: DEFAULT_MODEL.to_string() }
    }

    pub fn answer(&self, requested: &str, question: &str, content: &str) -> ServedAnswer {
        let Dispatch { strategy, model_used, fell_back } = self.get(requested);
        info!("Answering question using {} model: {}", model_used, question);
        ServedAnswer::new(strategy.answer_question(question, content), model_used, fell_back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_canonical_keys() {
        assert_eq!(canonical("nltk-advanced"), LEXICAL_MODEL);
        assert_eq!(canonical("tensorflow"), UNIVERSAL_ENCODER_MODEL);
        assert_eq!(canonical("distilbert"), SPAN_MODEL);
        assert_eq!(canonical("unknown"), "unknown");
    }

    #[test]
    fn catalog_serializes_display_name_as_name() {
        let info = ModelInfo { display_name: "DistilBERT".into(), description: "d".into(), available: false, reason: None };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "DistilBERT", "description": "d", "available": false }));
    }
}
