use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;

use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;

use crate::pool::{l2_normalize, masked_mean};
use crate::tokenize::tokenize_batch;

/// Sentence-transformer (BERT family, e.g. all-MiniLM-L6-v2) with masked mean pooling.
pub struct EmbeddingModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
    dim: usize,
    max_len: usize,
    pad_id: u32,
    normalize: bool,
}

impl EmbeddingModel {
    pub fn load(settings: &EmbeddingSettings) -> Result<Self> {
        let device = select_device();
        let model_dir = resolve_model_dir(settings)?;
        info!("Loading {} from {}", settings.model_name, model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let pad_id = tokenizer.get_padding().map(|p| p.pad_id).unwrap_or(0);

        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(model_dir.join("config.json"))?)?;
        let vb = load_weights(&model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        let dim = config.hidden_size;
        info!("Embedding model ready (dim={})", dim);

        Ok(Self {
            model,
            tokenizer,
            device,
            id: format!("minilm:{}:d{}", settings.model_name, dim),
            dim,
            max_len: settings.max_len,
            pad_id,
            normalize: settings.normalize,
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let mut pooled = masked_mean(&hidden, &attention_mask)?;
        if self.normalize { pooled = l2_normalize(&pooled)?; }
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_dtype(candle_core::DType::F32)?.to_vec2()?;
        Ok(rows)
    }
}

impl Embedder for EmbeddingModel {
    fn id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let out = self.embed_chunk(texts)?;
        debug!("Embedded {} texts in {} ms", texts.len(), start.elapsed().as_millis());
        Ok(out)
    }
}

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Embedding on Metal");
                return device;
            }
            Err(e) => tracing::warn!("Metal unavailable, using CPU: {}", e),
        }
    }
    info!("Embedding on CPU");
    Device::Cpu
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the file is only read, and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? };
        return Ok(vb);
    }
    let bin = model_dir.join("pytorch_model.bin");
    if bin.exists() {
        let weights: std::collections::HashMap<String, Tensor> = candle_core::pickle::read_all(&bin)?.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights, DTYPE, device));
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

fn resolve_model_dir(settings: &EmbeddingSettings) -> Result<PathBuf> {
    if let Some(dir) = &settings.model_dir {
        let p = docqa_core::config::expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(anyhow!("embedding.model_dir {} does not exist", p.display()));
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") { let p = PathBuf::from(&dir); if p.exists() { info!("Using MODEL_DIR: {}", p.display()); return Ok(p); } }
    for candidate in [format!("models/{}", settings.model_name), format!("../models/{}", settings.model_name)] {
        let p = PathBuf::from(&candidate);
        if p.exists() { return Ok(p); }
    }
    Err(anyhow!("Could not locate model directory for {}", settings.model_name))
}
