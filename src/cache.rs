// file: src/cache.rs
// description: bounded in-memory store of extracted package-insert text per drug name
// reference: https://docs.rs/lru

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Shared across request handlers; clones point at the same entries.
#[derive(Clone)]
pub struct TextCache {
    inner: Arc<Mutex<LruCache<String, String>>>,
    capacity: NonZeroUsize,
}

impl TextCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
            capacity,
        }
    }

    /// Trimmed, whitespace-collapsed, lowercased form of a drug name.
    pub fn normalize_key(key: &str) -> String {
        key.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    pub async fn put(&self, key: &str, text: String) {
        let key = Self::normalize_key(key);
        if key.is_empty() {
            return;
        }

        let mut cache = self.inner.lock().await;
        if let Some((evicted, _)) = cache.push(key.clone(), text)
            && evicted != key
        {
            debug!("Evicted cached text for '{}'", evicted);
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let key = Self::normalize_key(key);
        if key.is_empty() {
            return None;
        }
        self.inner.lock().await.get(&key).cloned()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
