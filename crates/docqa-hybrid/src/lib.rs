//! docqa-hybrid
//!
//! Hybrid retrieval over one ingested corpus: the index set (chunk store,
//! BM25 and dense index), the blended ranker, the atomically swapped active
//! set, ingestion, and a small result cache.

pub mod active;
pub mod cache;
pub mod index_set;
pub mod ingest;
pub mod ranker;
pub mod service;

pub use active::ActiveIndex;
pub use cache::RetrievalCache;
pub use index_set::IndexSet;
pub use ingest::Ingestor;
pub use ranker::HybridRanker;
pub use service::{RetrievalService, Status};
