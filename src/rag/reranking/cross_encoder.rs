// Cross-encoder relevance model (XLM-RoBERTa sequence classifier via Candle)
use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config, XLMRobertaForSequenceClassification};
use hf_hub::{api::sync::Api, Cache, Repo, RepoType};
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::config::RerankerConfig;
use crate::rag::reranking::scorer::RelevanceModel;

const MODEL_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];
const DEFAULT_PAD_ID: u32 = 1;

/// Local paths of the files a cross-encoder needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Files already present in the local HuggingFace cache, if complete
    pub fn from_cache(model_id: &str) -> Option<Self> {
        let repo = Cache::default().repo(Repo::new(model_id.to_string(), RepoType::Model));
        let mut found = MODEL_FILES.iter().map(|name| repo.get(name));
        Some(Self {
            config: found.next()??,
            tokenizer: found.next()??,
            weights: found.next()??,
        })
    }

    /// Fetch missing files from the HuggingFace Hub
    pub fn download(model_id: &str) -> Result<Self> {
        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        Ok(Self {
            config: repo.get("config.json").context("Failed to download model config")?,
            tokenizer: repo.get("tokenizer.json").context("Failed to download tokenizer")?,
            weights: repo
                .get("model.safetensors")
                .context("Failed to download model weights")?,
        })
    }
}

/// Pairwise relevance scorer
pub struct CrossEncoder {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    pad_id: u32,
    device: Device,
}

impl CrossEncoder {
    /// Load from the local cache, downloading only when files are missing
    pub fn load(config: &RerankerConfig) -> Result<Self> {
        info!(model = %config.model_id, "Initializing reranker model...");
        let files = match ModelFiles::from_cache(&config.model_id) {
            Some(files) => files,
            None => ModelFiles::download(&config.model_id)?,
        };
        let encoder = Self::from_files(&files, config.max_sequence_length)?;
        info!("Reranker model initialized.");
        Ok(encoder)
    }

    /// Load from explicit file paths
    pub fn from_files(files: &ModelFiles, max_sequence_length: usize) -> Result<Self> {
        let device = Device::Cpu;

        let config_contents =
            std::fs::read_to_string(&files.config).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&config_contents).context("Failed to parse model config")?;

        let mut tokenizer = load_tokenizer(&files.tokenizer)?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        let pad_id = tokenizer.token_to_id("<pad>").unwrap_or(DEFAULT_PAD_ID);

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)
                .context("Failed to load model weights")?
        };
        let model = XLMRobertaForSequenceClassification::new(1, &config, vb)
            .context("Failed to create cross-encoder model")?;

        Ok(Self {
            model,
            tokenizer,
            pad_id,
            device,
        })
    }

    fn score_batch(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        let encodings = self
            .tokenizer
            .encode_batch(pairs.to_vec(), true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

        let mut ids = vec![self.pad_id; batch_size * max_len];
        let mut mask = vec![0u32; batch_size * max_len];
        for (row, encoding) in encodings.iter().enumerate() {
            let start = row * max_len;
            let len = encoding.get_ids().len();
            ids[start..start + len].copy_from_slice(encoding.get_ids());
            mask[start..start + len].copy_from_slice(encoding.get_attention_mask());
        }

        let input_ids = Tensor::from_vec(ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?
            .to_dtype(DType::F32)?
            .squeeze(1)?;
        let scores = candle_nn::ops::sigmoid(&logits)?;

        Ok(scores.to_vec1::<f32>()?)
    }
}

impl RelevanceModel for CrossEncoder {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        self.score_batch(pairs)
    }
}

fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path).map_err(|e| anyhow!("Failed to load tokenizer: {}", e))
}
