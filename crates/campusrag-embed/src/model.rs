use anyhow::{anyhow, Result};
use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use campusrag_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_normalize;
use crate::tokenize::tokenize_padded;

/// Hidden size of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Sequences longer than this are truncated before the forward pass.
const MAX_SEQ_LEN: usize = 256;

/// Local all-MiniLM-L6-v2 sentence embedder.
///
/// Loads `tokenizer.json`, `config.json`, and `model.safetensors` from a
/// model directory and produces unit-normalized 384-dim vectors via
/// masked mean pooling.
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl MiniLmEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading MiniLM embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("failed to load tokenizer from {}: {e}", tokenizer_path.display()))?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("model.safetensors");
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = BertModel::load(vb, &config)?;
        let dim = config.hidden_size;
        tracing::info!(dim, layers = config.num_hidden_layers, "MiniLM model loaded");

        Ok(Self { model, tokenizer, device, dim })
    }

    fn forward(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize_padded(&self.tokenizer, text, MAX_SEQ_LEN, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_normalize(&hidden, &attention_mask)?;
        let vector = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        anyhow::ensure!(vector.len() == self.dim, "unexpected embedding width {}", vector.len());
        Ok(vector)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.forward(text)
    }
}
