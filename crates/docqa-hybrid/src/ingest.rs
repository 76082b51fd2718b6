use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use docqa_core::chunking::RecursiveSplitter;
use docqa_core::config::{LexicalSettings, Metric, Settings};
use docqa_core::data_processor::DataProcessor;
use docqa_core::error::Result;
use docqa_core::traits::Embedder;
use docqa_core::types::ChunkStore;
use docqa_vector::BuildOptions;

use crate::index_set::IndexSet;

/// Builds a fresh [`IndexSet`] from raw documents and persists it. Nothing
/// here touches the published set; callers publish the result on success.
pub struct Ingestor {
    processor: DataProcessor,
    embedder: Arc<dyn Embedder>,
    lexical: LexicalSettings,
    metric: Metric,
    options: BuildOptions,
    snapshot_path: Option<PathBuf>,
}

impl Ingestor {
    pub fn new(settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let splitter = RecursiveSplitter::from_settings(&settings.chunking)?;
        Ok(Self {
            processor: DataProcessor::new(splitter),
            embedder,
            lexical: settings.lexical.clone(),
            metric: settings.dense.metric,
            options: BuildOptions { batch_size: settings.embedding.batch_size, show_progress: settings.embedding.show_progress },
            snapshot_path: settings.storage.snapshot_path(),
        })
    }

    pub fn with_processor(mut self, processor: DataProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    pub fn lexical_settings(&self) -> &LexicalSettings { &self.lexical }

    pub fn snapshot_path(&self) -> Option<&Path> { self.snapshot_path.as_deref() }

    pub fn build_from_dir(&self, dir: &Path) -> Result<IndexSet> {
        let store = self.processor.process_directory(dir)?;
        self.build(store)
    }

    pub fn build_from_texts(&self, texts: &[String]) -> Result<IndexSet> {
        let store = self.processor.process_texts(texts)?;
        self.build(store)
    }

    fn build(&self, store: ChunkStore) -> Result<IndexSet> {
        let start = Instant::now();
        let set = IndexSet::build(store, Arc::clone(&self.embedder), &self.lexical, self.metric, self.options)?;
        if let Some(path) = &self.snapshot_path {
            set.snapshot().write_atomic(path)?;
        }
        info!("Ingested {} chunks in {} ms", set.len(), start.elapsed().as_millis());
        Ok(set)
    }
}
