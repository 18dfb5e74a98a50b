use std::path::Path;

use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

pub fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let path = model_dir.join("tokenizer.json");
    Tokenizer::from_file(&path).map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", path.display(), e))
}

/// Encode `texts` as one batch, truncated to `max_len` and right-padded with
/// `pad_id` to the longest row. Returns `(input_ids, attention_mask)`, both `[B, T]` u32.
pub fn encode_batch_on_device(
    tokenizer: &Tokenizer,
    texts: &[String],
    max_len: usize,
    pad_id: u32,
    device: &Device,
) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let rows: Vec<(Vec<u32>, Vec<u32>)> = encodings
        .iter()
        .map(|enc| {
            let mut ids = enc.get_ids().to_vec();
            let mut mask = enc.get_attention_mask().to_vec();
            if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); }
            (ids, mask)
        })
        .collect();
    let width = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);
    let mut all_ids = Vec::with_capacity(rows.len() * width);
    let mut all_mask = Vec::with_capacity(rows.len() * width);
    for (mut ids, mut mask) in rows {
        let pad = width - ids.len();
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend(std::iter::repeat(0).take(pad));
        all_ids.extend(ids);
        all_mask.extend(mask);
    }
    let batch = texts.len();
    let input_ids = Tensor::from_vec(all_ids, (batch, width), device)?;
    let attention_mask = Tensor::from_vec(all_mask, (batch, width), device)?;
    Ok((input_ids, attention_mask))
}

fn truncating(tokenizer: &Tokenizer, max_len: usize, strategy: TruncationStrategy) -> Result<Tokenizer> {
    let mut tokenizer = tokenizer.clone();
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            strategy,
            stride: 0,
            direction: TruncationDirection::Right,
        }))
        .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

/// Budgeted encodings for a span model. Pairs cut only the context so the
/// question survives; single texts are cut before the closing special token.
#[derive(Clone)]
pub struct SpanEncoder {
    pair: Tokenizer,
    single: Tokenizer,
}

impl SpanEncoder {
    pub fn new(tokenizer: &Tokenizer, max_len: usize) -> Result<Self> {
        Ok(Self {
            pair: truncating(tokenizer, max_len, TruncationStrategy::OnlySecond)?,
            single: truncating(tokenizer, max_len, TruncationStrategy::LongestFirst)?,
        })
    }

    pub fn encode_pair(&self, question: &str, context: &str) -> Result<Encoding> {
        self.pair.encode((question, context), true).map_err(|e| anyhow!("Tokenization failed: {}", e))
    }

    pub fn encode_single(&self, text: &str) -> Result<Encoding> {
        self.single.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))
    }
}
