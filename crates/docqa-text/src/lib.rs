//! docqa-text
//!
//! Sparse lexical ranking: BM25 scores for every chunk of a store, with
//! whitespace or tantivy-analyzed tokenization.

pub mod analysis;
pub mod bm25;

pub use analysis::TermTokenizer;
pub use bm25::{top_n_from_scores, Bm25Index};
