//! BM25 (Okapi) lexical index over a chunk store.
//!
//! `idf(t) = ln(N - df + 0.5) - ln(df + 0.5)`. Terms frequent enough to get a
//! negative idf are floored to `epsilon * mean_idf`, the mean taken over the
//! whole vocabulary. Scores are aligned with chunk positions.

use std::collections::HashMap;
use tracing::debug;

use docqa_core::config::LexicalSettings;
use docqa_core::types::ChunkStore;

use crate::analysis::TermTokenizer;

#[derive(Debug, Clone)]
pub struct Bm25Index {
    tokenizer: TermTokenizer,
    k1: f64,
    b: f64,
    doc_len: Vec<f64>,
    avgdl: f64,
    /// term -> [(position, term frequency)], positions ascending
    postings: HashMap<String, Vec<(usize, u32)>>,
    idf: HashMap<String, f64>,
}

impl Bm25Index {
    pub fn build(store: &ChunkStore, settings: &LexicalSettings) -> Self {
        Self::from_texts(store.iter().map(|c| c.text.as_str()), settings)
    }

    pub fn from_texts<'a, I>(texts: I, settings: &LexicalSettings) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tokenizer = TermTokenizer::new(settings.tokenization);
        let mut doc_len = Vec::new();
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut total_terms = 0usize;

        for (position, text) in texts.into_iter().enumerate() {
            let terms = tokenizer.tokenize(text);
            total_terms += terms.len();
            doc_len.push(terms.len() as f64);
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for term in terms { *freqs.entry(term).or_insert(0) += 1; }
            for (term, tf) in freqs { postings.entry(term).or_default().push((position, tf)); }
        }

        let corpus_size = doc_len.len();
        let avgdl = if corpus_size == 0 { 0.0 } else { total_terms as f64 / corpus_size as f64 };
        let idf = compute_idf(&postings, corpus_size, settings.epsilon);
        debug!(chunks = corpus_size, terms = postings.len(), avgdl, "built bm25 index");

        Self { tokenizer, k1: settings.k1, b: settings.b, doc_len, avgdl, postings, idf }
    }

    pub fn len(&self) -> usize { self.doc_len.len() }

    pub fn is_empty(&self) -> bool { self.doc_len.is_empty() }

    pub fn tokenizer(&self) -> &TermTokenizer { &self.tokenizer }

    pub fn idf(&self, term: &str) -> Option<f64> { self.idf.get(term).copied() }

    /// One score per chunk, aligned by position. Unknown query terms add
    /// nothing; a repeated query term counts once per occurrence.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let mut scores = vec![0.0; self.len()];
        if self.avgdl <= 0.0 {
            return scores;
        }
        for term in self.tokenizer.tokenize(query) {
            let Some(idf) = self.idf.get(&term).copied() else { continue };
            let Some(postings) = self.postings.get(&term) else { continue };
            for &(position, tf) in postings {
                let tf = f64::from(tf);
                let norm = self.k1 * (1.0 - self.b + self.b * self.doc_len[position] / self.avgdl);
                scores[position] += idf * (tf * (self.k1 + 1.0)) / (tf + norm);
            }
        }
        scores
    }

    /// Positions of the `n` highest-scoring chunks; ties go to the lower position.
    pub fn top_n(&self, query: &str, n: usize) -> Vec<usize> {
        top_n_from_scores(&self.scores(query), n)
    }
}

/// Positions of the `n` largest scores, descending, ties by ascending position.
pub fn top_n_from_scores(scores: &[f64], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // stable: equal scores keep ascending positions
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(n);
    order
}

fn compute_idf(postings: &HashMap<String, Vec<(usize, u32)>>, corpus_size: usize, epsilon: f64) -> HashMap<String, f64> {
    let n = corpus_size as f64;
    let mut idf: HashMap<String, f64> = HashMap::with_capacity(postings.len());
    let mut idf_sum = 0.0;
    let mut negative = Vec::new();
    for (term, docs) in postings {
        let df = docs.len() as f64;
        let value = (n - df + 0.5).ln() - (df + 0.5).ln();
        idf_sum += value;
        if value < 0.0 { negative.push(term.clone()); }
        idf.insert(term.clone(), value);
    }
    if idf.is_empty() {
        return idf;
    }
    let floor = epsilon * (idf_sum / idf.len() as f64);
    for term in negative { idf.insert(term, floor); }
    idf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_breaks_ties_by_position() {
        assert_eq!(top_n_from_scores(&[1.0, 3.0, 1.0, 3.0, 0.0], 3), vec![1, 3, 0]);
        assert_eq!(top_n_from_scores(&[0.0, 0.0], 5), vec![0, 1]);
        assert!(top_n_from_scores(&[], 2).is_empty());
    }
}
