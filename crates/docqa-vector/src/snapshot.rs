//! On-disk snapshot of an ingested corpus.
//!
//! A snapshot carries the chunk texts, their dense vectors and the settings
//! they were built with. The lexical index is not stored; it is rebuilt from
//! the texts on load. Files are written to a temporary sibling and renamed
//! into place, so a reader never sees a half-written snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use docqa_core::config::{Metric, Tokenization};
use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::ChunkStore;

use crate::flat::DenseIndex;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderInfo {
    pub id: String,
    pub dim: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub embedder: EmbedderInfo,
    pub metric: Metric,
    pub tokenization: Tokenization,
    /// blake3 over the chunk texts, see [`content_digest`].
    pub digest: String,
    pub chunks: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
}

impl Snapshot {
    pub fn capture(store: &ChunkStore, dense: &DenseIndex, tokenization: Tokenization) -> Self {
        let chunks = store.texts();
        let digest = content_digest(&chunks);
        Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            embedder: EmbedderInfo { id: dense.embedder().id().to_string(), dim: dense.dim() },
            metric: dense.metric(),
            tokenization,
            digest,
            chunks,
            vectors: dense.vectors().to_vec(),
        }
    }

    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        info!("Saved snapshot of {} chunks to {}", self.chunks.len(), path.display());
        Ok(())
    }

    /// Reads and checks a snapshot: version, digest, and that every chunk has
    /// exactly one vector of the recorded dimension.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Snapshot(format!("{}: {}", path.display(), e)))?;
        snapshot.validate()?;
        debug!(chunks = snapshot.chunks.len(), embedder = %snapshot.embedder.id, "read snapshot");
        Ok(snapshot)
    }

    fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::Snapshot(format!("unsupported snapshot version {} (expected {})", self.version, SNAPSHOT_VERSION)));
        }
        if self.chunks.len() != self.vectors.len() {
            return Err(Error::Snapshot(format!("{} chunks but {} vectors", self.chunks.len(), self.vectors.len())));
        }
        if let Some(v) = self.vectors.iter().find(|v| v.len() != self.embedder.dim) {
            return Err(Error::Snapshot(format!("vector of length {} in a d{} snapshot", v.len(), self.embedder.dim)));
        }
        if content_digest(&self.chunks) != self.digest {
            return Err(Error::Snapshot("chunk digest does not match contents".into()));
        }
        Ok(())
    }

    /// A snapshot is only usable with the embedder that produced it.
    pub fn check_embedder(&self, embedder: &dyn Embedder) -> Result<()> {
        if embedder.id() != self.embedder.id || embedder.dim() != self.embedder.dim {
            return Err(Error::InvalidConfig(format!(
                "snapshot was built with {} (d{}), current embedder is {} (d{})",
                self.embedder.id,
                self.embedder.dim,
                embedder.id(),
                embedder.dim()
            )));
        }
        Ok(())
    }
}

/// Length-prefixed blake3 digest of the chunk sequence.
pub fn content_digest(texts: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for text in texts {
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
