//! Error types for scopecache
//!
//! All modules use `ScopeCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scopecache operations
pub type ScopeCacheResult<T> = Result<T, ScopeCacheError>;

/// All errors that can occur in scopecache
#[derive(Error, Debug)]
pub enum ScopeCacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid scope configuration: {0}")]
    ScopeInvalid(String),

    #[error("Scope not configured: {0}")]
    ScopeNotFound(String),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Store errors
    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    #[error("Cache store is corrupt at {path}: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("Manifest entry {url} returned status {status}")]
    BadManifestResponse { url: String, status: u16 },

    // Network errors
    #[error("Network request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    // Worker lifecycle errors
    #[error("Invalid worker transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Worker for scope {scope} is not active (state: {state})")]
    WorkerNotActive { scope: String, state: String },

    #[error("Invalid event state: {0}")]
    InvalidEventState(String),

    #[error("Registration not found for scope {0}")]
    RegistrationNotFound(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScopeCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid transition error from two displayable states
    pub fn transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::WorkerNotActive { .. } | Self::RegistrationNotFound(_) => {
                Some("Run: scopecache deploy --scope <scope>")
            }
            Self::ScopeNotFound(_) => Some("Run: scopecache config show to list configured scopes"),
            Self::Network { .. } => Some("Check [origin] base_url in the configuration"),
            Self::StoreCorrupt { .. } => Some("Remove the cache file or run: scopecache purge"),
            _ => None,
        }
    }
}
