//! Hybrid ranking: dense and lexical candidates merged, then scored with a
//! fixed linear blend.
//!
//! Dense candidates get a flat vector component of `1.0`, lexical-only ones
//! `0.5`; the dense similarity itself does not enter the score. The lexical
//! component is the min-max normalized BM25 score over all chunks, or `0.5`
//! when every chunk scores the same.

use std::collections::HashSet;
use tracing::debug;

use docqa_core::error::Result;
use docqa_core::types::{Candidate, Origin, ScoredCandidate};
use docqa_text::top_n_from_scores;

use crate::index_set::IndexSet;

pub const VECTOR_WEIGHT: f64 = 0.7;
pub const LEXICAL_WEIGHT: f64 = 0.3;
pub const DENSE_VECTOR_SCORE: f64 = 1.0;
pub const LEXICAL_ONLY_VECTOR_SCORE: f64 = 0.5;
/// Lexical component used when the score range is below [`DEGENERATE_RANGE`].
pub const NEUTRAL_LEXICAL_SCORE: f64 = 0.5;
pub const DEGENERATE_RANGE: f64 = 1e-8;

pub struct HybridRanker<'a> {
    set: &'a IndexSet,
}

impl<'a> HybridRanker<'a> {
    pub fn new(set: &'a IndexSet) -> Self { Self { set } }

    /// Up to `2k` dense and `2k` lexical candidates, dense first, one entry
    /// per distinct chunk text.
    pub fn candidates(&self, query: &str, k: usize) -> Result<Vec<Candidate>> {
        let scores = self.set.lexical().scores(query);
        self.merge(query, k, &scores)
    }

    /// Candidates with their hybrid score, best first, at most `k`.
    pub fn rank(&self, query: &str, k: usize) -> Result<Vec<ScoredCandidate>> {
        if k == 0 || self.set.is_empty() {
            return Ok(Vec::new());
        }
        let scores = self.set.lexical().scores(query);
        let candidates = self.merge(query, k, &scores)?;

        let (min, max) = scores
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        let range = max - min;
        let degenerate = range <= DEGENERATE_RANGE;
        if degenerate {
            debug!(min, max, "degenerate lexical score distribution");
        }

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|c| {
                let vector = match c.origin {
                    Origin::Dense => DENSE_VECTOR_SCORE,
                    Origin::Lexical => LEXICAL_ONLY_VECTOR_SCORE,
                };
                let lexical = if degenerate { NEUTRAL_LEXICAL_SCORE } else { (scores[c.index] - min) / range };
                ScoredCandidate { index: c.index, origin: c.origin, score: VECTOR_WEIGHT * vector + LEXICAL_WEIGHT * lexical }
            })
            .collect();
        // stable: equal scores keep merge order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        debug!(k, returned = scored.len(), "hybrid rank");
        Ok(scored)
    }

    /// Texts of the top `k` ranked chunks.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let store = self.set.store();
        Ok(self
            .rank(query, k)?
            .into_iter()
            .filter_map(|c| store.get(c.index).map(str::to_string))
            .collect())
    }

    fn merge(&self, query: &str, k: usize, lexical_scores: &[f64]) -> Result<Vec<Candidate>> {
        if k == 0 || self.set.is_empty() {
            return Ok(Vec::new());
        }
        let store = self.set.store();
        let fetch = k.saturating_mul(2);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for hit in self.set.dense().search(query, fetch)? {
            let index = store.canonical(hit.index);
            if seen.insert(index) {
                out.push(Candidate { index, origin: Origin::Dense, dense_similarity: Some(hit.similarity) });
            }
        }
        for position in top_n_from_scores(lexical_scores, fetch) {
            let index = store.canonical(position);
            if seen.insert(index) {
                out.push(Candidate { index, origin: Origin::Lexical, dense_similarity: None });
            }
        }
        Ok(out)
    }
}
