//! Configuration management for GuardianAI
//!
//! TOML file at `~/.guardian/config.toml` (or `$GUARDIAN_CONFIG`), with
//! credentials and endpoints overridable from the environment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{PipelineError, Result};

pub const ENV_CONFIG_PATH: &str = "GUARDIAN_CONFIG";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_QDRANT_URL: &str = "QDRANT_URL";
pub const ENV_QDRANT_API_KEY: &str = "QDRANT_API_KEY";

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub reranker: RerankerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Embedding and chat-completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Vector store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub collection: String,
}

/// Cross-encoder model location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    pub model_id: String,
    pub max_sequence_length: usize,
}

/// Retrieval and context sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Over-fetch width requested from vector search
    pub retrieval_limit: usize,
    /// Chunks kept after reranking
    pub context_size: usize,
    pub embedding_dimension: usize,
}

/// Worker pool sizing for blocking stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub max_blocking_threads: usize,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-large".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            collection: "gpdr_corpus".to_string(),
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model_id: "BAAI/bge-reranker-base".to_string(),
            max_sequence_length: 512,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retrieval_limit: 20,
            context_size: 5,
            embedding_dimension: 3072,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_blocking_threads: num_cpus::get().max(1),
        }
    }
}

impl Config {
    /// Read `path` (or the default location), apply environment overrides, validate
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// File (if present) plus environment overrides, without validation
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file without touching the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Configuration(format!("cannot serialize config: {}", e)))?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Write default values to `path` unless a file is already there
    ///
    /// Returns whether a file was written. Secrets are never written.
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Config::default().save(path)?;
        Ok(true)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            PipelineError::Configuration("could not determine home directory".to_string())
        })?;
        Ok(home.join(".guardian").join("config.toml"))
    }

    /// Overlay values found through `lookup` (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_OPENAI_API_KEY) {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_OPENAI_BASE_URL) {
            self.openai.base_url = url;
        }
        if let Some(url) = lookup(ENV_QDRANT_URL) {
            self.qdrant.url = Some(url);
        }
        if let Some(key) = lookup(ENV_QDRANT_API_KEY) {
            self.qdrant.api_key = Some(key);
        }
    }

    /// Fail fast on anything that would stop the service from answering
    pub fn validate(&self) -> Result<()> {
        if self.openai.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(PipelineError::Configuration(format!(
                "missing environment variable {}",
                ENV_OPENAI_API_KEY
            )));
        }
        if self.qdrant.url.as_deref().map_or(true, str::is_empty) {
            return Err(PipelineError::Configuration(format!(
                "missing environment variable {}",
                ENV_QDRANT_URL
            )));
        }
        if self.pipeline.context_size == 0 {
            return Err(PipelineError::Configuration(
                "pipeline.context_size must be at least 1".to_string(),
            ));
        }
        if self.pipeline.retrieval_limit < self.pipeline.context_size {
            return Err(PipelineError::Configuration(format!(
                "pipeline.retrieval_limit ({}) is smaller than pipeline.context_size ({})",
                self.pipeline.retrieval_limit, self.pipeline.context_size
            )));
        }
        if self.runtime.max_blocking_threads == 0 {
            return Err(PipelineError::Configuration(
                "runtime.max_blocking_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy safe to print: secrets replaced with a mask
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.openai.api_key = mask(&self.openai.api_key);
        copy.qdrant.api_key = mask(&self.qdrant.api_key);
        copy
    }
}
