//! Persistent cache storage
//!
//! Each named cache lives in `<root>/<sha256(name)>.json`. Names are arbitrary
//! strings, so the file name is derived from a hash and the real name is kept
//! inside the document. Writes go to a temp file and are renamed into place.

use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::{CacheStorage, CachedResponse, NamedCache};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cache storage backed by a directory of JSON documents
#[derive(Debug)]
pub struct DiskStorage {
    root: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl DiskStorage {
    /// Create a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the named cache
    pub fn cache_path(&self, name: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        self.root
            .join(format!("{}.json", hex::encode(hasher.finalize())))
    }

    async fn read_cache(&self, name: &str) -> ScopeCacheResult<Option<NamedCache>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            ScopeCacheError::io(format!("reading cache file {}", path.display()), e)
        })?;

        let cache: NamedCache =
            serde_json::from_str(&content).map_err(|e| ScopeCacheError::StoreCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Some(cache))
    }

    async fn write_cache(&self, cache: &NamedCache) -> ScopeCacheResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            ScopeCacheError::io(format!("creating store directory {}", self.root.display()), e)
        })?;

        let path = self.cache_path(&cache.name);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string(cache)?;

        fs::write(&tmp, content).await.map_err(|e| {
            ScopeCacheError::io(format!("writing cache file {}", tmp.display()), e)
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| {
            ScopeCacheError::io(format!("replacing cache file {}", path.display()), e)
        })?;

        debug!("Wrote cache {} ({} entries)", cache.name, cache.entries.len());
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> ScopeCacheResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.read_cache(name).await?.is_none() {
            self.write_cache(&NamedCache::new(name)).await?;
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> ScopeCacheResult<bool> {
        Ok(self.cache_path(name).exists())
    }

    /// Unparseable files carry no readable name and are left out, so
    /// activation sweeps never reach them; `has` and `match_in` still see them.
    async fn keys(&self) -> ScopeCacheResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut caches = vec![];
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ScopeCacheError::io("reading store directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ScopeCacheError::io("reading store entry", e))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path).await else {
                continue;
            };
            match serde_json::from_str::<NamedCache>(&content) {
                Ok(cache) => caches.push((cache.created_at, cache.name)),
                Err(e) => warn!(
                    "Skipping unreadable cache file {} ({}); it will not be swept, remove it by hand",
                    path.display(),
                    e
                ),
            }
        }

        caches.sort();
        Ok(caches.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete(&self, name: &str) -> ScopeCacheResult<bool> {
        let _guard = self.write_lock.lock().await;
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).await.map_err(|e| {
            ScopeCacheError::io(format!("deleting cache file {}", path.display()), e)
        })?;
        Ok(true)
    }

    async fn match_in(&self, name: &str, key: &str) -> ScopeCacheResult<Option<CachedResponse>> {
        Ok(self
            .read_cache(name)
            .await?
            .and_then(|cache| cache.get(key).cloned()))
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> ScopeCacheResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut cache = self
            .read_cache(name)
            .await?
            .unwrap_or_else(|| NamedCache::new(name));
        for (key, response) in entries {
            cache.insert(key, response);
        }
        self.write_cache(&cache).await
    }

    async fn entries(&self, name: &str) -> ScopeCacheResult<Vec<String>> {
        self.read_cache(name)
            .await?
            .map(|cache| cache.keys())
            .ok_or_else(|| ScopeCacheError::CacheNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn response(url: &str, body: &str) -> (String, CachedResponse) {
        (url.to_string(), CachedResponse::new(url, 200, body))
    }

    #[tokio::test]
    async fn survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = DiskStorage::new(temp.path());
            store
                .put_all("root-site-cache-v1", vec![response("/", "index")])
                .await
                .unwrap();
        }

        let store = DiskStorage::new(temp.path());
        let hit = store.match_in("root-site-cache-v1", "/").await.unwrap();
        assert_eq!(hit.unwrap().body, b"index");
    }

    #[tokio::test]
    async fn cache_names_are_hashed_into_file_names() {
        let temp = TempDir::new().unwrap();
        let store = DiskStorage::new(temp.path());
        let path = store.cache_path("../escape/attempt");

        assert_eq!(path.parent(), Some(temp.path()));
        assert_eq!(path.file_stem().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn keys_sorted_by_creation() {
        let temp = TempDir::new().unwrap();
        let store = DiskStorage::new(temp.path());
        store.open("first").await.unwrap();
        store.open("second").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn keys_skip_corrupt_files() {
        let temp = TempDir::new().unwrap();
        let store = DiskStorage::new(temp.path());
        store.open("good").await.unwrap();
        tokio::fs::write(temp.path().join("junk.json"), "not json")
            .await
            .unwrap();
        tokio::fs::write(store.cache_path("broken"), "{")
            .await
            .unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["good"]);
        assert!(store.has("broken").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let temp = TempDir::new().unwrap();
        let store = DiskStorage::new(temp.path());
        store.open("gone").await.unwrap();

        assert!(store.delete("gone").await.unwrap());
        assert!(!store.cache_path("gone").exists());
        assert!(!store.delete("gone").await.unwrap());
    }

    #[tokio::test]
    async fn put_all_replaces_existing_keys() {
        let temp = TempDir::new().unwrap();
        let store = DiskStorage::new(temp.path());
        store
            .put_all("c", vec![response("/", "old"), response("/a", "a")])
            .await
            .unwrap();
        store.put_all("c", vec![response("/", "new")]).await.unwrap();

        assert_eq!(store.entries("c").await.unwrap(), vec!["/", "/a"]);
        let hit = store.match_in("c", "/").await.unwrap().unwrap();
        assert_eq!(hit.body, b"new");
    }

    #[tokio::test]
    async fn corrupt_cache_is_reported_on_match() {
        let temp = TempDir::new().unwrap();
        let store = DiskStorage::new(temp.path());
        tokio::fs::write(store.cache_path("bad"), "{").await.unwrap();

        assert!(matches!(
            store.match_in("bad", "/").await,
            Err(ScopeCacheError::StoreCorrupt { .. })
        ));
    }
}
