//! Turns an upload directory (or raw texts) into a [`ChunkStore`].
//!
//! Every usable document is concatenated with a blank line between documents
//! and then split. A batch that yields no text at all is an ingestion error.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::chunking::RecursiveSplitter;
use crate::error::{Error, Result};
use crate::traits::TextExtractor;
use crate::types::ChunkStore;

const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Text extracted from one uploaded file.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
}

/// Reads `.txt` and `.md` files as UTF-8, replacing invalid sequences.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extensions(&self) -> &[&'static str] { &["txt", "md"] }

    fn extract(&self, path: &Path) -> anyhow::Result<String> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
        }
    }
}

/// PDF text via `pdf-extract`; pages are concatenated as the library returns them.
#[cfg(feature = "pdf")]
#[derive(Debug, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    fn extensions(&self) -> &[&'static str] { &["pdf"] }

    fn extract(&self, path: &Path) -> anyhow::Result<String> {
        use anyhow::Context;
        pdf_extract::extract_text(path).with_context(|| format!("Failed to extract text from {}", path.display()))
    }
}

pub struct DataProcessor {
    extractors: Vec<Box<dyn TextExtractor>>,
    splitter: RecursiveSplitter,
}

impl DataProcessor {
    /// Processor with every extractor compiled into this build.
    pub fn new(splitter: RecursiveSplitter) -> Self {
        let mut extractors: Vec<Box<dyn TextExtractor>> = vec![Box::new(PlainTextExtractor)];
        #[cfg(feature = "pdf")]
        extractors.push(Box::new(PdfExtractor));
        Self { extractors, splitter }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn splitter(&self) -> &RecursiveSplitter { &self.splitter }

    /// Extracts every supported file under `dir`, in path order. Files that
    /// fail to extract or contain only whitespace are skipped with a warning.
    pub fn load_directory(&self, dir: &Path) -> Result<Vec<SourceDocument>> {
        if !dir.is_dir() {
            return Err(Error::Ingestion(format!("upload directory {} does not exist", dir.display())));
        }
        let mut documents = Vec::new();
        for path in self.list_files(dir) {
            let Some(extractor) = self.extractor_for(&path) else { continue };
            let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            match extractor.extract(&path) {
                Ok(text) if text.trim().is_empty() => warn!("No text extracted from {}", file_name),
                Ok(text) => {
                    info!("Processed {}: {} characters", file_name, text.chars().count());
                    documents.push(SourceDocument { path, text });
                }
                Err(e) => warn!("Error processing {}: {:#}", file_name, e),
            }
        }
        Ok(documents)
    }

    pub fn process_directory(&self, dir: &Path) -> Result<ChunkStore> {
        let documents = self.load_directory(dir)?;
        let texts: Vec<String> = documents.into_iter().map(|d| d.text).collect();
        self.process_texts(&texts)
    }

    /// Joins the non-blank texts and splits them into a store.
    pub fn process_texts(&self, texts: &[String]) -> Result<ChunkStore> {
        let usable: Vec<&str> = texts.iter().map(String::as_str).filter(|t| !t.trim().is_empty()).collect();
        if usable.is_empty() {
            return Err(Error::Ingestion("no valid documents found or no text could be extracted".into()));
        }
        let chunks = self.splitter.split_text(&usable.join(DOCUMENT_SEPARATOR));
        if chunks.is_empty() {
            return Err(Error::Ingestion("document text produced no chunks".into()));
        }
        info!("Created {} text chunks", chunks.len());
        Ok(ChunkStore::new(chunks))
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn TextExtractor> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extractors.iter().find(|x| x.extensions().iter().any(|e| *e == ext)).map(|b| &**b)
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}
