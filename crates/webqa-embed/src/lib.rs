//! webqa-embed
//!
//! candle-backed models: the BERT sentence encoder used by the embedding
//! strategies, the DistilBERT span model, and a hashing embedder that stands
//! in for the encoder in tests.

pub mod device;
pub mod fake;
pub mod model_dir;
pub mod pool;
pub mod sentence;
pub mod span;
pub mod tokenize;

use anyhow::Result;
use tracing::info;
use webqa_core::config::AppConfig;
use webqa_core::traits::Embedder;

pub use device::select_device;
pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;
pub use sentence::SentenceEncoder;
pub use span::DistilBertQa;

/// Output width of the hashing embedder; matches all-MiniLM-L6-v2.
pub const FAKE_EMBEDDING_DIM: usize = 384;

/// True when `APP_USE_FAKE_EMBEDDINGS` is `1` or `true`.
pub fn fake_embeddings_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// The sentence encoder named by the config, or the [`FakeEmbedder`] when
/// fake embeddings are enabled in the config or the environment.
pub fn get_default_embedder(config: &AppConfig) -> Result<Box<dyn Embedder>> {
    if config.use_fake_embeddings || fake_embeddings_requested() {
        info!("Using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    let models = &config.models;
    let device = select_device(models.prefer_gpu);
    Ok(Box::new(SentenceEncoder::load(&models.sentence_encoder_path(), models.sentence_max_len, device)?))
}

/// The DistilBERT span model named by the config.
pub fn load_span_model(config: &AppConfig) -> Result<DistilBertQa> {
    let models = &config.models;
    let device = select_device(models.prefer_gpu);
    DistilBertQa::load(&models.span_model_path(), models.span_max_len, device)
}
