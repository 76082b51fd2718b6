//! docqa-core
//!
//! Shared vocabulary for the retrieval workspace: chunk types, the error
//! taxonomy, the embedder/retriever/extractor traits, configuration, and the
//! ingestion front half (document loading and splitting).

pub mod chunking;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
