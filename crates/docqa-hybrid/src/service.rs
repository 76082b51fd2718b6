use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use docqa_core::config::Settings;
use docqa_core::error::Result;
use docqa_core::traits::{Embedder, Retriever};
use docqa_vector::Snapshot;

use crate::active::ActiveIndex;
use crate::cache::RetrievalCache;
use crate::index_set::IndexSet;
use crate::ingest::Ingestor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub ready: bool,
    pub generation: Option<u64>,
    pub chunk_count: usize,
    pub snapshot_exists: bool,
}

/// Entry point for a serving layer: ingestion, snapshot loading and cached
/// retrieval against the currently published index set.
pub struct RetrievalService {
    ingestor: Ingestor,
    active: ActiveIndex,
    cache: RetrievalCache,
    upload_dir: PathBuf,
    default_k: usize,
    ingest_lock: Mutex<()>,
}

impl RetrievalService {
    pub fn new(settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            ingestor: Ingestor::new(settings, embedder)?,
            active: ActiveIndex::new(),
            cache: RetrievalCache::new(settings.retrieval.cache_capacity),
            upload_dir: settings.storage.upload_dir(),
            default_k: settings.retrieval.k,
            ingest_lock: Mutex::new(()),
        })
    }

    pub fn with_ingestor(mut self, ingestor: Ingestor) -> Self {
        self.ingestor = ingestor;
        self
    }

    pub fn default_k(&self) -> usize { self.default_k }

    pub fn upload_dir(&self) -> &Path { &self.upload_dir }

    pub fn active(&self) -> &ActiveIndex { &self.active }

    /// Publishes the snapshot at the configured path. Returns `false` when no
    /// snapshot path is configured or the file does not exist yet. Holds the
    /// ingestion lock throughout, so a load never overtakes a newer build.
    pub fn load_snapshot(&self) -> Result<bool> {
        let _guard = self.ingest_lock.lock();
        let Some(path) = self.ingestor.snapshot_path() else { return Ok(false) };
        if !path.exists() {
            debug!("No snapshot at {}", path.display());
            return Ok(false);
        }
        let snapshot = Snapshot::read(path)?;
        let set = IndexSet::from_snapshot(snapshot, Arc::clone(self.ingestor.embedder()), self.ingestor.lexical_settings())?;
        info!("Loaded snapshot {} ({} chunks)", path.display(), set.len());
        self.publish(set);
        Ok(true)
    }

    /// Rebuilds from every supported file under `dir` and publishes the
    /// result. On error the previously published set stays active.
    pub fn ingest_dir(&self, dir: &Path) -> Result<u64> {
        let _guard = self.ingest_lock.lock();
        let set = self.ingestor.build_from_dir(dir)?;
        Ok(self.publish(set))
    }

    /// [`Self::ingest_dir`] over the configured upload directory.
    pub fn ingest_uploads(&self) -> Result<u64> { self.ingest_dir(&self.upload_dir) }

    pub fn ingest_texts(&self, texts: &[String]) -> Result<u64> {
        let _guard = self.ingest_lock.lock();
        let set = self.ingestor.build_from_texts(texts)?;
        Ok(self.publish(set))
    }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let (generation, set) = self.active.current()?;
        if let Some(hit) = self.cache.get(generation, query, k) {
            debug!(generation, k, "retrieval cache hit");
            return Ok(hit);
        }
        let results = set.retrieve(query, k)?;
        self.cache.insert(generation, query, k, results.clone());
        Ok(results)
    }

    pub fn status(&self) -> Status {
        let current = self.active.current().ok();
        Status {
            ready: current.is_some(),
            generation: current.as_ref().map(|(g, _)| *g),
            chunk_count: current.as_ref().map(|(_, set)| set.len()).unwrap_or(0),
            snapshot_exists: self.ingestor.snapshot_path().is_some_and(Path::exists),
        }
    }

    fn publish(&self, set: IndexSet) -> u64 {
        let generation = self.active.publish(Arc::new(set));
        self.cache.clear();
        generation
    }
}

impl Retriever for RetrievalService {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> { RetrievalService::retrieve(self, query, k) }
}
