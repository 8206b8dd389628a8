//! In-process cache storage

use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::{CacheStorage, CachedResponse, NamedCache};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Cache storage held in memory, guarded by a single lock
#[derive(Debug, Default)]
pub struct MemoryStorage {
    caches: RwLock<Vec<NamedCache>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> ScopeCacheResult<()> {
        let mut caches = self.caches.write().await;
        if !caches.iter().any(|c| c.name == name) {
            caches.push(NamedCache::new(name));
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> ScopeCacheResult<bool> {
        Ok(self.caches.read().await.iter().any(|c| c.name == name))
    }

    async fn keys(&self) -> ScopeCacheResult<Vec<String>> {
        Ok(self
            .caches
            .read()
            .await
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> ScopeCacheResult<bool> {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|c| c.name != name);
        Ok(caches.len() != before)
    }

    async fn match_in(&self, name: &str, key: &str) -> ScopeCacheResult<Option<CachedResponse>> {
        Ok(self
            .caches
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.get(key))
            .cloned())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> ScopeCacheResult<()> {
        // Single write guard: readers see the batch all at once.
        let mut caches = self.caches.write().await;
        let idx = match caches.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                caches.push(NamedCache::new(name));
                caches.len() - 1
            }
        };
        for (key, response) in entries {
            caches[idx].insert(key, response);
        }
        Ok(())
    }

    async fn entries(&self, name: &str) -> ScopeCacheResult<Vec<String>> {
        self.caches
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .map(NamedCache::keys)
            .ok_or_else(|| ScopeCacheError::CacheNotFound(name.to_string()))
    }
}
