//! BERT-family sentence encoder (all-MiniLM-L6-v2 and friends): mean pooling
//! over real tokens followed by L2 normalization.

use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};
use webqa_core::traits::Embedder;

use crate::model_dir::{load_var_builder, read_config, resolve_model_dir};
use crate::pool::masked_mean_l2;
use crate::tokenize::{encode_batch_on_device, load_tokenizer};

/// Texts encoded per forward pass.
const BATCH_SIZE: usize = 32;

pub struct SentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl SentenceEncoder {
    pub fn load(model_dir: &Path, max_len: usize, device: Device) -> Result<Self> {
        let model_dir = resolve_model_dir(model_dir)?;
        info!("Loading sentence encoder from {}", model_dir.display());
        let tokenizer = load_tokenizer(&model_dir)?;
        let raw_config = read_config(&model_dir)?;
        let dim = raw_config
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let pad_id = raw_config.get("pad_token_id").and_then(serde_json::Value::as_u64).unwrap_or(0) as u32;
        let config: BertConfig = serde_json::from_value(raw_config)?;
        let vb = load_var_builder(&model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!(dim, "Sentence encoder loaded");
        Ok(Self { model, tokenizer, device, dim, max_len, pad_id })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) =
            encode_batch_on_device(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for SentenceEncoder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(n = texts.len(), ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

/// Flatten a `[1, H]` or `[H]` tensor into a vector.
pub fn tensor_to_vec(t: &Tensor) -> Result<Vec<f32>> {
    Ok(t.to_device(&Device::Cpu)?.flatten_all()?.to_vec1::<f32>()?)
}
