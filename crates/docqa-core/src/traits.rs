use std::path::Path;

/// Text → fixed-length vector. Used to build the dense index and to embed
/// queries, so one instance must serve both.
pub trait Embedder: Send + Sync {
    /// Stable identifier persisted alongside the vectors (e.g. `minilm:all-MiniLM-L6-v2`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// The one operation the serving layer needs from the retrieval core.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str, k: usize) -> crate::error::Result<Vec<String>>;
}

/// Pulls plain text out of one uploaded file.
pub trait TextExtractor: Send + Sync {
    /// Lowercase file extensions handled by this extractor, without the dot.
    fn extensions(&self) -> &[&'static str];
    fn extract(&self, path: &Path) -> anyhow::Result<String>;
}
