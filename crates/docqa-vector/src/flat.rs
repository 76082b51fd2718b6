use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{debug, info};

use docqa_core::config::Metric;
use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::ChunkStore;

/// One dense search result. `rank` is 0 for the nearest chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseHit {
    pub index: usize,
    pub rank: usize,
    /// Cosine similarity, or `1 / (1 + distance)` under L2. Higher is closer.
    pub similarity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub batch_size: usize,
    pub show_progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self { Self { batch_size: 32, show_progress: false } }
}

/// Exact nearest-neighbour index: one stored vector per chunk position.
pub struct DenseIndex {
    embedder: Arc<dyn Embedder>,
    metric: Metric,
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl DenseIndex {
    /// Embeds every chunk of `store`, in order, with `embedder`.
    pub fn build(store: &ChunkStore, embedder: Arc<dyn Embedder>, metric: Metric, options: BuildOptions) -> Result<Self> {
        let texts = store.texts();
        let pb = if options.show_progress { ProgressBar::new(texts.len() as u64) } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)") {
            pb.set_style(style.progress_chars("#>-"));
        }
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(options.batch_size.max(1)) {
            let embedded = embedder.embed_batch(batch).map_err(Error::Embedding)?;
            if embedded.len() != batch.len() {
                return Err(Error::Embedding(anyhow::anyhow!("embedder returned {} vectors for {} texts", embedded.len(), batch.len())));
            }
            vectors.extend(embedded);
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        info!("Embedded {} chunks with {}", vectors.len(), embedder.id());
        Self::from_vectors(embedder, metric, vectors)
    }

    /// Wraps precomputed vectors (e.g. from a snapshot). Every vector must have
    /// the embedder's dimension and finite components.
    pub fn from_vectors(embedder: Arc<dyn Embedder>, metric: Metric, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dim = embedder.dim();
        for (index, v) in vectors.iter().enumerate() {
            if v.len() != dim { return Err(Error::DimensionMismatch { expected: dim, actual: v.len() }); }
            if v.iter().any(|x| !x.is_finite()) { return Err(Error::InvalidVector { index }); }
        }
        Ok(Self { embedder, metric, dim, vectors })
    }

    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    pub fn dim(&self) -> usize { self.dim }

    pub fn metric(&self) -> Metric { self.metric }

    pub fn vectors(&self) -> &[Vec<f32>] { &self.vectors }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    /// Embeds `query` and returns up to `k` nearest chunks, nearest first.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<DenseHit>> {
        if k == 0 || self.is_empty() { return Ok(Vec::new()); }
        let mut embedded = self.embedder.embed_batch(&[query.to_string()]).map_err(Error::Embedding)?;
        let q = embedded.pop().ok_or_else(|| Error::Embedding(anyhow::anyhow!("embedder returned no vector for the query")))?;
        self.search_vector(&q, k)
    }

    /// Up to `k` nearest chunks to `q`; equal distances keep position order.
    pub fn search_vector(&self, q: &[f32], k: usize) -> Result<Vec<DenseHit>> {
        if q.len() != self.dim { return Err(Error::DimensionMismatch { expected: self.dim, actual: q.len() }); }
        if q.iter().any(|x| !x.is_finite()) {
            return Err(Error::Embedding(anyhow::anyhow!("query embedding has non-finite components")));
        }
        if k == 0 { return Ok(Vec::new()); }

        let q_norm = norm(q);
        // (position, closeness); larger closeness is nearer
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| match self.metric {
                Metric::L2 => (i, -squared_l2(q, v)),
                Metric::Cosine => (i, cosine(q, q_norm, v)),
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        debug!(k, hits = scored.len(), "dense search");

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(rank, (index, closeness))| {
                let similarity = match self.metric {
                    Metric::L2 => 1.0 / (1.0 + (-closeness).max(0.0).sqrt()),
                    Metric::Cosine => closeness,
                };
                DenseHit { index, rank, similarity }
            })
            .collect())
    }
}

fn norm(v: &[f32]) -> f32 { v.iter().map(|x| x * x).sum::<f32>().sqrt() }

fn squared_l2(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum() }

fn cosine(q: &[f32], q_norm: f32, v: &[f32]) -> f32 {
    let denom = q_norm * norm(v);
    if denom <= f32::EPSILON { return 0.0; }
    q.iter().zip(v).map(|(x, y)| x * y).sum::<f32>() / denom
}
