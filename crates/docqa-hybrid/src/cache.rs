use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hasher;
use tracing::debug;
use twox_hash::XxHash64;

type Key = (u64, u64, usize);

struct Entry {
    query: String,
    results: Vec<String>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<Key, Entry>,
    order: VecDeque<Key>,
}

/// Bounded FIFO cache of retrieval results keyed by
/// `(generation, xxhash64(query), k)`. Capacity 0 disables it.
pub struct RetrievalCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RetrievalCache {
    pub fn new(capacity: usize) -> Self { Self { capacity, inner: Mutex::new(Inner::default()) } }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn get(&self, generation: u64, query: &str, k: usize) -> Option<Vec<String>> {
        if self.capacity == 0 { return None; }
        let inner = self.inner.lock();
        let entry = inner.entries.get(&key(generation, query, k))?;
        // a hash collision must not return another query's results
        (entry.query == query).then(|| entry.results.clone())
    }

    pub fn insert(&self, generation: u64, query: &str, k: usize, results: Vec<String>) {
        if self.capacity == 0 { return; }
        let key = key(generation, query, k);
        let mut inner = self.inner.lock();
        if inner.entries.insert(key, Entry { query: query.to_string(), results }).is_none() {
            inner.order.push_back(key);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() { inner.entries.remove(&oldest); }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        if !inner.entries.is_empty() { debug!(entries = inner.entries.len(), "clearing retrieval cache"); }
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize { self.inner.lock().entries.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

fn key(generation: u64, query: &str, k: usize) -> Key {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(query.as_bytes());
    (generation, hasher.finish(), k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(s: &str) -> Vec<String> { vec![s.to_string()] }

    #[test]
    fn evicts_oldest_first() {
        let cache = RetrievalCache::new(2);
        cache.insert(1, "a", 3, hit("A"));
        cache.insert(1, "b", 3, hit("B"));
        cache.insert(1, "c", 3, hit("C"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1, "a", 3), None);
        assert_eq!(cache.get(1, "c", 3), Some(hit("C")));
    }

    #[test]
    fn generation_and_k_are_part_of_the_key() {
        let cache = RetrievalCache::new(8);
        cache.insert(1, "q", 3, hit("old"));
        assert_eq!(cache.get(2, "q", 3), None);
        assert_eq!(cache.get(1, "q", 2), None);
        assert_eq!(cache.get(1, "q", 3), Some(hit("old")));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = RetrievalCache::new(0);
        cache.insert(1, "q", 3, hit("x"));
        assert!(cache.is_empty());
        assert_eq!(cache.get(1, "q", 3), None);
    }
}
