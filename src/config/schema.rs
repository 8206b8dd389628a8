//! Configuration schema for scopecache
//!
//! Configuration is stored at `~/.config/scopecache/config.toml`

use crate::error::{ScopeCacheError, ScopeCacheResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Cache name owned by the root scope
pub const ROOT_CACHE_NAME: &str = "root-site-cache-v1";

/// Cache name owned by the `/myapp/` scope
pub const MYAPP_CACHE_NAME: &str = "myapp-site-cache-v1";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Origin the scopes are served from
    pub origin: OriginConfig,

    /// Cache store settings
    pub store: StoreConfig,

    /// One record per deployed worker scope
    pub scopes: Vec<ScopeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            origin: OriginConfig::default(),
            store: StoreConfig::default(),
            scopes: vec![ScopeConfig::root(), ScopeConfig::myapp()],
        }
    }
}

impl Config {
    /// Look up a scope record by its scope path
    pub fn scope(&self, scope: &str) -> ScopeCacheResult<&ScopeConfig> {
        self.scopes
            .iter()
            .find(|s| s.scope == scope)
            .ok_or_else(|| ScopeCacheError::ScopeNotFound(scope.to_string()))
    }

    /// Check scope records for empty names and duplicate scopes
    pub fn validate(&self) -> ScopeCacheResult<()> {
        let mut seen = HashSet::new();
        for scope in &self.scopes {
            if scope.scope.is_empty() {
                return Err(ScopeCacheError::ScopeInvalid(
                    "scope path must not be empty".to_string(),
                ));
            }
            if scope.cache_name.is_empty() {
                return Err(ScopeCacheError::ScopeInvalid(format!(
                    "scope {} has an empty cache_name",
                    scope.scope
                )));
            }
            if !seen.insert(scope.scope.as_str()) {
                return Err(ScopeCacheError::ScopeInvalid(format!(
                    "scope {} is configured more than once",
                    scope.scope
                )));
            }
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record lifecycle events in the audit log
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Origin settings used to resolve relative request URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL, e.g. `http://localhost:8080`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Cache store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding named caches (defaults to `<state_dir>/caches`)
    pub path: Option<PathBuf>,
}

/// Configuration record for one cache lifecycle manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Path scope the worker controls, e.g. `/` or `/myapp/`
    pub scope: String,

    /// Versioned cache name owned by this scope
    pub cache_name: String,

    /// Resources fetched into the cache at install time
    #[serde(default)]
    pub manifest: Vec<String>,

    /// Cache names kept at activation; `None` disables eviction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<String>>,
}

impl ScopeConfig {
    /// Create a scope record with no manifest and no eviction
    pub fn new(scope: impl Into<String>, cache_name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            cache_name: cache_name.into(),
            manifest: vec![],
            whitelist: None,
        }
    }

    /// Set the install manifest
    pub fn with_manifest<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Enable whitelist eviction at activation
    pub fn with_whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// The root scope deployment
    pub fn root() -> Self {
        Self::new("/", ROOT_CACHE_NAME).with_manifest([
            "/",
            "/other.html",
            "/myapp/another.html",
            "/styles/index.css",
            "/styles/another.css",
            "/js/another.js",
        ])
    }

    /// The `/myapp/` sub-scope deployment
    pub fn myapp() -> Self {
        Self::new("/myapp/", MYAPP_CACHE_NAME)
            .with_whitelist([MYAPP_CACHE_NAME, ROOT_CACHE_NAME])
    }

    /// Whether activation sweeps caches outside the whitelist
    pub fn evicts(&self) -> bool {
        self.whitelist.is_some()
    }

    /// Cache names that survive an activation sweep.
    ///
    /// Always contains the scope's own cache.
    pub fn retained_caches(&self) -> HashSet<&str> {
        let mut retained: HashSet<&str> = self
            .whitelist
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        retained.insert(self.cache_name.as_str());
        retained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[[scopes]]"));
        assert!(toml.contains(ROOT_CACHE_NAME));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scopes.len(), 2);
        assert_eq!(config.origin.base_url, "http://localhost:8080");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [origin]
            base_url = "https://example.test"

            [[scopes]]
            scope = "/docs/"
            cache_name = "docs-v3"
            manifest = ["/docs/index.html"]
            whitelist = ["docs-v3"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.origin.base_url, "https://example.test");
        assert_eq!(config.origin.timeout_secs, 30); // default preserved
        assert_eq!(config.scopes.len(), 1);
        assert!(config.scope("/docs/").unwrap().evicts());
    }

    #[test]
    fn default_scopes_match_deployments() {
        let root = ScopeConfig::root();
        assert!(!root.evicts());
        assert_eq!(root.manifest.len(), 6);

        let myapp = ScopeConfig::myapp();
        assert!(myapp.manifest.is_empty());
        assert!(myapp.retained_caches().contains(ROOT_CACHE_NAME));
    }

    #[test]
    fn retained_caches_include_own_name() {
        let scope = ScopeConfig::new("/a/", "a-v2").with_whitelist(["shared-v1"]);
        let retained = scope.retained_caches();
        assert!(retained.contains("a-v2"));
        assert!(retained.contains("shared-v1"));
        assert_eq!(retained.len(), 2);
    }

    #[test]
    fn validate_rejects_duplicates() {
        let mut config = Config::default();
        config.scopes.push(ScopeConfig::new("/", "other-v1"));
        assert!(matches!(
            config.validate(),
            Err(ScopeCacheError::ScopeInvalid(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_cache_name() {
        let config = Config {
            scopes: vec![ScopeConfig::new("/", "")],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_scope_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.scope("/nope/"),
            Err(ScopeCacheError::ScopeNotFound(_))
        ));
    }
}
