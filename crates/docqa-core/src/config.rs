//! Lightweight configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys come from double underscores in env names, so
//! `APP_RETRIEVAL__K=5` overrides `retrieval.k`. Every setting has a default,
//! which means a missing `config.toml` is not an error.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Wraps an already-assembled figment; tests use this to avoid touching the
    /// working directory.
    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed, validated view of the whole configuration.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub lexical: LexicalSettings,
    pub dense: DenseSettings,
    pub embedding: EmbeddingSettings,
    pub storage: StorageSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap > self.chunking.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) is larger than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be positive".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Upper bound on chunk length, in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self { Self { chunk_size: 1000, chunk_overlap: 150 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub k: usize,
    /// Maximum cached `retrieve` results; 0 disables the cache.
    pub cache_capacity: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { k: 3, cache_capacity: 256 } }
}

/// How chunk and query text is cut into BM25 terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tokenization {
    /// Split on whitespace, no normalization.
    #[default]
    Whitespace,
    /// Word tokenizer with lowercasing and English stop words removed.
    Analyzed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalSettings {
    pub tokenization: Tokenization,
    pub k1: f64,
    pub b: f64,
    pub epsilon: f64,
}

impl Default for LexicalSettings {
    fn default() -> Self { Self { tokenization: Tokenization::Whitespace, k1: 1.5, b: 0.75, epsilon: 0.25 } }
}

/// Distance used by the dense index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    L2,
    Cosine,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenseSettings {
    pub metric: Metric,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    Minilm,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    /// Directory holding `tokenizer.json`, `config.json` and the weights.
    pub model_dir: Option<String>,
    pub model_name: String,
    pub dim: usize,
    pub max_len: usize,
    pub batch_size: usize,
    pub normalize: bool,
    pub show_progress: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Minilm,
            model_dir: None,
            model_name: "all-MiniLM-L6-v2".to_string(),
            dim: 384,
            max_len: 256,
            batch_size: 32,
            normalize: false,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub upload_dir: String,
    /// Where the index snapshot is written; empty disables persistence.
    pub snapshot_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self { Self { upload_dir: "uploaded_files".to_string(), snapshot_path: "vectorstore.json".to_string() } }
}

impl StorageSettings {
    pub fn upload_dir(&self) -> PathBuf { expand_path(&self.upload_dir) }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        if self.snapshot_path.trim().is_empty() { None } else { Some(expand_path(&self.snapshot_path)) }
    }
}

/// Expands `~` and `$VAR` / `${VAR}` in a configured path. Unknown variables
/// leave the input untouched.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let with_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    PathBuf::from(shellexpand::tilde(&with_env).as_ref())
}
