//! Configuration loader and typed settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_MODELS__SPAN_MODEL_DIR`). Every
//! setting has a default, so running without any config file is valid.
//! Extraction is lossy: env strings such as `1`/`true` coerce to booleans
//! and numbers.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Wrap an already-assembled figment (tests, embedding hosts).
    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner_lossy(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The full typed configuration.
    pub fn app(&self) -> anyhow::Result<AppConfig> {
        let app: AppConfig = self.figment.extract_lossy().map_err(|e| anyhow::anyhow!("Failed to extract config: {}", e))?;
        app.validate()?;
        Ok(app)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let app = self.app()?;
        if matches!(env, "prod" | "production") && app.use_fake_embeddings {
            return Err(Error::InvalidConfig("use_fake_embeddings must be off in production".into()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Swap the sentence encoder for the deterministic hashing embedder.
    pub use_fake_embeddings: bool,
    pub models: ModelsConfig,
    pub default: HeuristicConfig,
    pub lexical: LexicalConfig,
    pub distilbert: SpanConfig,
    pub universal_encoder: SemanticConfig,
    pub sentence_transformer: SemanticConfig,
    pub summary: SummaryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_fake_embeddings: false,
            models: ModelsConfig::default(),
            default: HeuristicConfig::default(),
            lexical: LexicalConfig::default(),
            distilbert: SpanConfig::default(),
            universal_encoder: SemanticConfig::universal_encoder(),
            sentence_transformer: SemanticConfig::sentence_transformer(),
            summary: SummaryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        let positive = [
            ("default.max_chunk_chars", self.default.max_chunk_chars),
            ("lexical.top_sentences", self.lexical.top_sentences),
            ("distilbert.max_chunk_words", self.distilbert.max_chunk_words),
            ("universal_encoder.chunk_sentences", self.universal_encoder.chunk_sentences),
            ("universal_encoder.top_chunks", self.universal_encoder.top_chunks),
            ("sentence_transformer.chunk_sentences", self.sentence_transformer.chunk_sentences),
            ("sentence_transformer.top_chunks", self.sentence_transformer.top_chunks),
            ("models.span_max_len", self.models.span_max_len),
            ("models.sentence_max_len", self.models.sentence_max_len),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory with `tokenizer.json`, `config.json` and weights of a BERT-family sentence encoder.
    pub sentence_encoder_dir: String,
    /// Directory of a DistilBERT checkpoint fine-tuned for extractive QA.
    pub span_model_dir: String,
    pub sentence_max_len: usize,
    pub span_max_len: usize,
    /// Try an accelerator before falling back to CPU.
    pub prefer_gpu: bool,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            sentence_encoder_dir: "models/all-MiniLM-L6-v2".to_string(),
            span_model_dir: "models/distilbert-base-cased-distilled-squad".to_string(),
            sentence_max_len: 256,
            span_max_len: 512,
            prefer_gpu: true,
        }
    }
}

impl ModelsConfig {
    pub fn sentence_encoder_path(&self) -> PathBuf { expand_path(&self.sentence_encoder_dir) }
    pub fn span_model_path(&self) -> PathBuf { expand_path(&self.span_model_dir) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub max_chunk_chars: usize,
    pub min_sentence_chars: usize,
    pub answer_sentences: usize,
    pub context_sentences: usize,
    pub confidence_cap: f32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self { max_chunk_chars: 5000, min_sentence_chars: 5, answer_sentences: 2, context_sentences: 3, confidence_cap: 0.95 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    pub min_sentence_chars: usize,
    /// Texts with at most this many sentences skip ranking entirely.
    pub short_text_sentences: usize,
    pub top_sentences: usize,
    pub tfidf_weight: f32,
}

impl Default for LexicalConfig {
    fn default() -> Self { Self { min_sentence_chars: 11, short_text_sentences: 10, top_sentences: 5, tfidf_weight: 3.0 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanConfig {
    /// Word budget per chunk (a rough token estimate).
    pub max_chunk_words: usize,
    /// Tokens kept on each side of the answer span in the returned context.
    pub context_window: usize,
}

impl Default for SpanConfig {
    fn default() -> Self { Self { max_chunk_words: 512, context_window: 10 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub min_sentence_chars: usize,
    pub chunk_sentences: usize,
    pub top_chunks: usize,
    pub top_sentences: usize,
    pub answer_sentences: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self { Self::universal_encoder() }
}

impl SemanticConfig {
    pub fn universal_encoder() -> Self {
        Self { min_sentence_chars: 11, chunk_sentences: 3, top_chunks: 3, top_sentences: 5, answer_sentences: 3 }
    }

    pub fn sentence_transformer() -> Self { Self { chunk_sentences: 5, ..Self::universal_encoder() } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_sentences: usize,
    pub max_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self { Self { max_sentences: 5, max_chars: 500 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
