//! In-memory content cache keyed by source URL.
//!
//! Built once at process start and handed to whoever aggregates content.
//! Entries are never evicted; concurrent writers to one key race and the last
//! write wins, which is fine because content for a URL is idempotent.

use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct ContentStore {
    entries: RwLock<HashMap<String, String>>,
}

impl ContentStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&self, url: impl Into<String>, content: impl Into<String>) {
        let mut entries = self.entries.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(url.into(), content.into());
    }

    pub fn get(&self, url: &str) -> Option<String> {
        self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner).get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner).contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Cached URLs, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> =
            self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner).keys().cloned().collect();
        urls.sort();
        urls
    }
}
