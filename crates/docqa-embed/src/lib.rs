//! docqa-embed
//!
//! Embedding functions behind `docqa_core::traits::Embedder`: a local BERT
//! sentence-transformer run with candle, and a hashing embedder for tests and
//! offline development.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use docqa_core::config::{EmbeddingProvider, EmbeddingSettings};
use docqa_core::traits::Embedder;

pub mod hash;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use model::EmbeddingModel;
pub use pool::{l2_normalize, masked_mean, masked_mean_l2};

/// Embedder selected by configuration. `APP_USE_FAKE_EMBEDDINGS=1` forces the
/// hashing embedder regardless of `embedding.provider`.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if use_fake || settings.provider == EmbeddingProvider::Hash {
        if settings.dim == 0 { anyhow::bail!("embedding.dim must be positive for the hash embedder"); }
        info!("Using HashEmbedder (dim={})", settings.dim);
        return Ok(Arc::new(HashEmbedder::new(settings.dim)));
    }
    Ok(Arc::new(EmbeddingModel::load(settings)?))
}
