use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

/// Thread-safe LRU cache for encyclopedia extracts, keyed by search term
pub struct ExtractCache {
    cache: Mutex<LruCache<String, String>>,
}

impl ExtractCache {
    /// Create a cache holding at most `capacity` extracts (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, term: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(term)
            .cloned()
    }

    pub fn put(&self, term: String, extract: String) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(term, extract);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
