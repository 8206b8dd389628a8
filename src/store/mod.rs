//! Named cache store
//!
//! Origin-wide key-value storage of request → response entries, partitioned
//! into named caches. A worker only ever holds the *name* of its slice; the
//! store itself outlives any worker.
//!
//! Two backends implement [`CacheStorage`]:
//!
//! | Backend | Persistence | Used by |
//! |---------|-------------|---------|
//! | [`MemoryStorage`] | process-local | tests, side-by-side scope runs |
//! | [`DiskStorage`] | one JSON file per cache | the CLI |

mod disk;
mod memory;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

use crate::error::ScopeCacheResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only request descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    /// Request URL, absolute or origin-relative (`/other.html`)
    pub url: String,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Key used for cache lookups
    pub fn key(&self) -> &str {
        &self.url
    }
}

/// A stored (or freshly fetched) response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// URL the response was produced for
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers, lowercased names
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes
    #[serde(with = "body_hex", default)]
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Add a header (name is lowercased)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Bodies are stored hex-encoded so cache files stay valid UTF-8 JSON.
mod body_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// One named cache: ordered request-key → response entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCache {
    /// Cache name (versioned, e.g. `root-site-cache-v1`)
    pub name: String,
    /// When the cache was first opened
    pub created_at: DateTime<Utc>,
    /// Entries in insertion order
    pub entries: Vec<(String, CachedResponse)>,
}

impl NamedCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            entries: vec![],
        }
    }

    /// Find the response stored for a key
    pub fn get(&self, key: &str) -> Option<&CachedResponse> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, response)| response)
    }

    /// Insert an entry, replacing an existing one with the same key in place
    pub fn insert(&mut self, key: String, response: CachedResponse) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = response,
            None => self.entries.push((key, response)),
        }
    }

    /// Request keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

/// Origin-wide named cache storage
///
/// Mirrors the host platform's cache storage API; per-call atomicity is the
/// backend's responsibility, callers take no locks.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a named cache, creating it if absent
    async fn open(&self, name: &str) -> ScopeCacheResult<()>;

    /// Whether a named cache exists
    async fn has(&self, name: &str) -> ScopeCacheResult<bool>;

    /// Names of all caches, oldest first
    async fn keys(&self) -> ScopeCacheResult<Vec<String>>;

    /// Delete a named cache; `false` if it did not exist
    async fn delete(&self, name: &str) -> ScopeCacheResult<bool>;

    /// Look up a request key in one named cache
    async fn match_in(&self, name: &str, key: &str) -> ScopeCacheResult<Option<CachedResponse>>;

    /// Insert a batch of entries; either all become visible or none do
    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> ScopeCacheResult<()>;

    /// Request keys stored in a named cache
    async fn entries(&self, name: &str) -> ScopeCacheResult<Vec<String>>;
}
