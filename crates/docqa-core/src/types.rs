//! Domain types shared by the lexical, dense and hybrid engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A passage of source text and its position in the [`ChunkStore`].
///
/// Identity is the `index`; two chunks may carry the same `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// The ordered, immutable sequence of chunks produced by one ingestion.
///
/// Position `i` here is document `i` in every index built from the store.
/// Construction also resolves the *canonical* index of each position: the
/// first position holding byte-identical text. Retrieval uses it so that
/// duplicate passages collapse onto a single candidate.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    canonical: Vec<usize>,
    first_index: HashMap<String, usize>,
}

impl ChunkStore {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut chunks = Vec::new();
        let mut canonical = Vec::new();
        let mut first_index: HashMap<String, usize> = HashMap::new();
        for (index, text) in texts.into_iter().enumerate() {
            let text = text.into();
            let first = *first_index.entry(text.clone()).or_insert(index);
            canonical.push(first);
            chunks.push(Chunk { index, text });
        }
        Self { chunks, canonical, first_index }
    }

    pub fn size(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn get(&self, index: usize) -> Option<&str> { self.chunks.get(index).map(|c| c.text.as_str()) }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> { self.chunks.get(index) }

    /// First position whose text equals the text at `index`. Out-of-range
    /// positions map to themselves.
    pub fn canonical(&self, index: usize) -> usize { self.canonical.get(index).copied().unwrap_or(index) }

    pub fn first_index_of(&self, text: &str) -> Option<usize> { self.first_index.get(text).copied() }

    /// Number of distinct texts in the store.
    pub fn distinct(&self) -> usize { self.first_index.len() }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> { self.chunks.iter() }

    pub fn texts(&self) -> Vec<String> { self.chunks.iter().map(|c| c.text.clone()).collect() }
}

/// Which index surfaced a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Dense,
    Lexical,
}

/// A chunk surfaced during one ranking pass, keyed by canonical index.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub origin: Origin,
    /// Raw similarity reported by the dense index, when it surfaced this chunk.
    pub dense_similarity: Option<f32>,
}

/// A candidate with its blended hybrid score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub index: usize,
    pub origin: Origin,
    pub score: f64,
}
