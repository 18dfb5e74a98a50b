//! DistilBERT with a `qa_outputs` head for extractive question answering
//! (distilbert-base-cased-distilled-squad).
//!
//! Pairs are encoded as `[CLS] question [SEP] context [SEP]`. Only the context
//! side is truncated to fit the token budget, so the question always survives.
//! Texts embedded on their own are truncated separately, keeping `[SEP]`.

use std::path::Path;

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::Linear;
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use tokenizers::Encoding;
use tracing::{debug, info, warn};
use webqa_core::traits::SpanModel;
use webqa_core::types::{PieceSegment, SpanLogits, TokenPiece};

use crate::model_dir::{load_var_builder, read_config, resolve_model_dir};
use crate::sentence::tensor_to_vec;
use crate::tokenize::{load_tokenizer, SpanEncoder};

pub struct DistilBertQa {
    model: DistilBertModel,
    qa_outputs: Linear,
    encoder: SpanEncoder,
    device: Device,
}

impl DistilBertQa {
    pub fn load(model_dir: &Path, max_len: usize, device: Device) -> Result<Self> {
        let model_dir = resolve_model_dir(model_dir)?;
        info!("Loading span model from {}", model_dir.display());
        let encoder = SpanEncoder::new(&load_tokenizer(&model_dir)?, max_len)?;

        let raw_config = read_config(&model_dir)?;
        let dim = raw_config
            .get("dim")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("config.json has no dim"))? as usize;
        let config: DistilBertConfig = serde_json::from_value(raw_config)?;
        let vb = load_var_builder(&model_dir, &device)?;
        let model = match DistilBertModel::load(vb.pp("distilbert"), &config) {
            Ok(m) => m,
            Err(e) => {
                warn!("No distilbert-prefixed weights ({}), trying unprefixed names", e);
                DistilBertModel::load(vb.clone(), &config)?
            }
        };
        let qa_outputs = candle_nn::linear(dim, 2, vb.pp("qa_outputs"))?;
        info!(dim, max_len, "Span model loaded");
        Ok(Self { model, qa_outputs, encoder, device })
    }

    /// Final hidden states `[1, T, H]` for one encoding.
    fn hidden(&self, encoding: &Encoding) -> Result<Tensor> {
        let ids = encoding.get_ids();
        let len = ids.len();
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        // 1 marks a position attention must skip; one unpadded sequence skips nothing.
        let mask = Tensor::zeros((1, 1, 1, len), DType::U8, &self.device)?;
        Ok(self.model.forward(&input_ids, &mask)?)
    }
}

fn pieces(encoding: &Encoding) -> Vec<TokenPiece> {
    encoding
        .get_sequence_ids()
        .into_iter()
        .zip(encoding.get_offsets())
        .zip(encoding.get_special_tokens_mask())
        .map(|((seq, &(start, end)), &special)| {
            let segment = match (seq, special) {
                (_, 1) | (None, _) => PieceSegment::Special,
                (Some(0), _) => PieceSegment::Question,
                (Some(_), _) => PieceSegment::Context,
            };
            TokenPiece { segment, start, end }
        })
        .collect()
}

impl SpanModel for DistilBertQa {
    fn cls_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self.encoder.encode_single(text)?;
        let hidden = self.hidden(&encoding)?;
        tensor_to_vec(&hidden.i((0, 0))?)
    }

    fn span_logits(&self, question: &str, context: &str) -> Result<SpanLogits> {
        let encoding = self.encoder.encode_pair(question, context)?;
        let hidden = self.hidden(&encoding)?;
        let logits = self.qa_outputs.forward(&hidden)?.squeeze(0)?;
        let start = tensor_to_vec(&logits.i((.., 0))?)?;
        let end = tensor_to_vec(&logits.i((.., 1))?)?;
        debug!(tokens = start.len(), "span logits computed");
        Ok(SpanLogits { pieces: pieces(&encoding), start, end })
    }
}
