//! Locating model directories and loading their weights.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use tracing::info;

/// The configured directory, or the same relative path one level up (for
/// binaries started from a crate directory).
pub fn resolve_model_dir(configured: &Path) -> Result<PathBuf> {
    if configured.is_dir() {
        info!("Using model dir: {}", configured.display());
        return Ok(configured.to_path_buf());
    }
    if configured.is_relative() {
        let parent = Path::new("..").join(configured);
        if parent.is_dir() {
            info!("Using model dir: {}", parent.display());
            return Ok(parent);
        }
    }
    Err(anyhow!("Could not locate model directory {}", configured.display()))
}

/// Weight files understood by [`load_var_builder`], in preference order.
pub const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

pub fn find_weights(model_dir: &Path) -> Result<PathBuf> {
    WEIGHT_FILES
        .iter()
        .map(|f| model_dir.join(f))
        .find(|p| p.is_file())
        .ok_or_else(|| anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

/// Read every tensor of a checkpoint into memory.
pub fn load_tensors(weights: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let is_safetensors = weights.extension().is_some_and(|e| e == "safetensors");
    if is_safetensors {
        Ok(candle_core::safetensors::load(weights, device)?)
    } else {
        let tensors = candle_core::pickle::read_all(weights)?;
        tensors.into_iter().map(|(name, t)| Ok((name, t.to_device(device)?))).collect()
    }
}

pub fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights = find_weights(model_dir)?;
    info!("Loading weights from {}", weights.display());
    let tensors = load_tensors(&weights, device)?;
    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

pub fn read_config(model_dir: &Path) -> Result<serde_json::Value> {
    let path = model_dir.join("config.json");
    let raw = std::fs::read_to_string(&path).map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_safetensors_and_reports_missing_weights() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_weights(tmp.path()).is_err());
        std::fs::write(tmp.path().join("pytorch_model.bin"), b"").unwrap();
        assert!(find_weights(tmp.path()).unwrap().ends_with("pytorch_model.bin"));
        std::fs::write(tmp.path().join("model.safetensors"), b"").unwrap();
        assert!(find_weights(tmp.path()).unwrap().ends_with("model.safetensors"));
    }

    #[test]
    fn missing_dir_is_an_error() {
        assert!(resolve_model_dir(Path::new("no/such/model/dir")).is_err());
    }
}
