//! Recursive character splitting of concatenated document text.
//!
//! Text is cut on the coarsest separator present (`"\n\n"`, then `"\n"`, then
//! `" "`, then between characters). Pieces keep their leading separator and
//! are merged greedily up to `chunk_size` characters; each new chunk starts
//! with up to `chunk_overlap` characters carried from the previous one.
//! Pieces that are still too long are split again with the next separator.

use std::collections::VecDeque;
use tracing::warn;

use crate::config::ChunkingSettings;
use crate::error::{Error, Result};

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if chunk_overlap > chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk overlap ({chunk_overlap}) is larger than chunk size ({chunk_size})"
            )));
        }
        let separators = DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect();
        Ok(Self { chunk_size, chunk_overlap, separators })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    pub fn chunk_overlap(&self) -> usize { self.chunk_overlap }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut short: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() {
                chunks.extend(self.merge(&short));
                short.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !short.is_empty() {
            chunks.extend(self.merge(&short));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!("Created a chunk of size {}, which is longer than the specified {}", total, self.chunk_size);
                }
                if !window.is_empty() {
                    out.extend(join(&window));
                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                        let Some(first) = window.pop_front() else { break };
                        total -= char_len(first);
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }
        out.extend(join(&window));
        out
    }
}

fn char_len(s: &str) -> usize { s.chars().count() }

fn join(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Splits on `separator`, attaching each separator to the start of the piece
/// that follows it. An empty separator splits between characters. Empty
/// pieces are dropped.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
