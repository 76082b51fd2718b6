use std::sync::Arc;
use tracing::info;

use docqa_core::config::{LexicalSettings, Metric, Tokenization};
use docqa_core::error::Result;
use docqa_core::traits::{Embedder, Retriever};
use docqa_core::types::ChunkStore;
use docqa_text::Bm25Index;
use docqa_vector::{BuildOptions, DenseIndex, Snapshot};

use crate::ranker::HybridRanker;

/// Chunk store plus the two indexes built over it. Position `i` means the
/// same chunk in all three; a set is immutable once built.
pub struct IndexSet {
    store: ChunkStore,
    lexical: Bm25Index,
    dense: DenseIndex,
    tokenization: Tokenization,
}

impl IndexSet {
    pub fn build(
        store: ChunkStore,
        embedder: Arc<dyn Embedder>,
        lexical: &LexicalSettings,
        metric: Metric,
        options: BuildOptions,
    ) -> Result<Self> {
        let lexical_index = Bm25Index::build(&store, lexical);
        let dense = DenseIndex::build(&store, embedder, metric, options)?;
        info!("Built index set over {} chunks ({} distinct)", store.size(), store.distinct());
        Ok(Self { store, lexical: lexical_index, dense, tokenization: lexical.tokenization })
    }

    /// Restores a set from a snapshot. The lexical index is rebuilt with the
    /// tokenization recorded in the snapshot.
    pub fn from_snapshot(snapshot: Snapshot, embedder: Arc<dyn Embedder>, lexical: &LexicalSettings) -> Result<Self> {
        snapshot.check_embedder(embedder.as_ref())?;
        let settings = LexicalSettings { tokenization: snapshot.tokenization, ..lexical.clone() };
        let store = ChunkStore::new(snapshot.chunks);
        let lexical_index = Bm25Index::build(&store, &settings);
        let dense = DenseIndex::from_vectors(embedder, snapshot.metric, snapshot.vectors)?;
        Ok(Self { store, lexical: lexical_index, dense, tokenization: settings.tokenization })
    }

    pub fn snapshot(&self) -> Snapshot { Snapshot::capture(&self.store, &self.dense, self.tokenization) }

    pub fn store(&self) -> &ChunkStore { &self.store }

    pub fn lexical(&self) -> &Bm25Index { &self.lexical }

    pub fn dense(&self) -> &DenseIndex { &self.dense }

    pub fn len(&self) -> usize { self.store.size() }

    pub fn is_empty(&self) -> bool { self.store.is_empty() }

    pub fn ranker(&self) -> HybridRanker<'_> { HybridRanker::new(self) }
}

impl Retriever for IndexSet {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> { self.ranker().retrieve(query, k) }
}
