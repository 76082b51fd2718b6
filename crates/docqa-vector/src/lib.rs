//! docqa-vector
//!
//! Dense side of retrieval: a flat exact-search index over chunk embeddings
//! and the JSON snapshot that persists it between runs.

pub mod flat;
pub mod snapshot;

pub use flat::{BuildOptions, DenseHit, DenseIndex};
pub use snapshot::{content_digest, EmbedderInfo, Snapshot, SNAPSHOT_VERSION};
