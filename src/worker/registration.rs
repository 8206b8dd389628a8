//! Persisted worker registrations
//!
//! One JSON record per scope, so separate CLI invocations agree on which
//! worker version controls a scope and what state it reached.

use crate::config::ConfigManager;
use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::worker::service::ServiceWorker;
use crate::worker::state::WorkerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Registration record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Scope path controlled by the worker
    pub scope: String,

    /// Cache name the registered version owns
    pub cache_name: String,

    /// Worker version ID
    pub worker_id: Uuid,

    /// Last recorded lifecycle state
    pub state: WorkerState,

    /// When the worker version was registered
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Snapshot a worker into a new record
    pub fn for_worker(worker: &ServiceWorker) -> Self {
        let now = Utc::now();
        Self {
            scope: worker.scope().config.scope.clone(),
            cache_name: worker.scope().cache_name().to_string(),
            worker_id: worker.id(),
            state: worker.state(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh state from the worker it describes
    pub fn update_from(&mut self, worker: &ServiceWorker) {
        self.state = worker.state();
        self.updated_at = Utc::now();
    }
}

/// Directory-backed registration records
pub struct RegistrationStore {
    dir: PathBuf,
}

impl RegistrationStore {
    /// Store under the default state directory
    pub fn new() -> Self {
        Self::with_dir(ConfigManager::registrations_dir())
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Record file for a scope: readable slug plus a short hash of the path
    pub fn file_path(&self, scope: &str) -> PathBuf {
        let slug: String = scope
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .trim_matches('-')
            .to_string();
        let slug = if slug.is_empty() { "root".to_string() } else { slug };

        let mut hasher = Sha256::new();
        hasher.update(scope.as_bytes());
        let hash = hex::encode(&hasher.finalize()[..6]);

        self.dir.join(format!("{}-{}.json", slug, hash))
    }

    /// Load the record for a scope
    pub async fn load(&self, scope: &str) -> ScopeCacheResult<Option<Registration>> {
        let path = self.file_path(scope);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            ScopeCacheError::io(format!("reading registration {}", path.display()), e)
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Load the record for a scope, failing if absent
    pub async fn get(&self, scope: &str) -> ScopeCacheResult<Registration> {
        self.load(scope)
            .await?
            .ok_or_else(|| ScopeCacheError::RegistrationNotFound(scope.to_string()))
    }

    /// Write a record
    pub async fn save(&self, registration: &Registration) -> ScopeCacheResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ScopeCacheError::io("creating registrations directory", e))?;

        let path = self.file_path(&registration.scope);
        let content = serde_json::to_string_pretty(registration)?;
        fs::write(&path, content).await.map_err(|e| {
            ScopeCacheError::io(format!("writing registration {}", path.display()), e)
        })?;

        debug!(
            "Saved registration for {} ({})",
            registration.scope, registration.state
        );
        Ok(())
    }

    /// Record a worker's current state, replacing any older version's record
    pub async fn record(&self, worker: &ServiceWorker) -> ScopeCacheResult<Registration> {
        let scope = &worker.scope().config.scope;
        let registration = match self.load(scope).await? {
            Some(mut existing) if existing.worker_id == worker.id() => {
                existing.update_from(worker);
                existing
            }
            Some(existing) => {
                info!(
                    "Worker {} replaces {} for {}",
                    worker.id(),
                    existing.worker_id,
                    scope
                );
                Registration::for_worker(worker)
            }
            None => Registration::for_worker(worker),
        };

        self.save(&registration).await?;
        Ok(registration)
    }

    /// All records, sorted by scope
    pub async fn list(&self) -> ScopeCacheResult<Vec<Registration>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut registrations = vec![];
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| ScopeCacheError::io("reading registrations directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ScopeCacheError::io("reading registration entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path).await.ok();
                if let Some(content) = content {
                    if let Ok(registration) = serde_json::from_str::<Registration>(&content) {
                        registrations.push(registration);
                    }
                }
            }
        }

        registrations.sort_by(|a, b| a.scope.cmp(&b.scope));
        Ok(registrations)
    }
}

impl Default for RegistrationStore {
    fn default() -> Self {
        Self::new()
    }
}
