use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Unordered pair of paths: `(a, b)` and `(b, a)` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(PathBuf, PathBuf);

impl PairKey {
    pub fn new(a: &Path, b: &Path) -> Self {
        if a <= b {
            Self(a.to_path_buf(), b.to_path_buf())
        } else {
            Self(b.to_path_buf(), a.to_path_buf())
        }
    }
}

/// Memo of pairwise similarity verdicts with a hard entry limit.
///
/// Once `capacity` entries are stored, further results are not cached.
/// Nothing is evicted.
#[derive(Debug, Clone)]
pub struct SimilarityCache {
    entries: HashMap<PairKey, bool>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl SimilarityCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, a: &Path, b: &Path) -> Option<bool> {
        let found = self.entries.get(&PairKey::new(a, b)).copied();
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    /// Store a verdict. Returns false when the cache is full and the value was dropped.
    pub fn insert(&mut self, a: &Path, b: &Path, similar: bool) -> bool {
        let key = PairKey::new(a, b);
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = similar;
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.entries.insert(key, similar);
        true
    }

    /// Cached verdict for the pair, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, a: &Path, b: &Path, compute: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if let Some(similar) = self.get(a, b) {
            return similar;
        }
        let similar = compute();
        if !self.insert(a, b, similar) {
            log::debug!("Similarity cache full ({} entries), not caching result", self.capacity);
        }
        similar
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(hits, misses)` since creation or the last `clear`.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
