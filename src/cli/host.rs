//! Host wiring for CLI commands
//!
//! Plays the platform's part: owns the on-disk cache store, the HTTP network,
//! the audit log and the registration records, and builds workers on top.

use crate::audit::AuditLog;
use crate::config::{Config, ConfigManager, ScopeConfig};
use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::network::{HttpNetwork, Network};
use crate::store::{CacheStorage, DiskStorage};
use crate::worker::{Registration, RegistrationStore, ServiceWorker, WorkerScope, WorkerState};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Host {
    pub config: Config,
    pub store: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub registrations: RegistrationStore,
    audit: AuditLog,
}

impl Host {
    /// Build the host for a loaded configuration
    pub fn new(config: &Config) -> Self {
        let store_dir = ConfigManager::store_dir(config);
        debug!("Using cache store at {}", store_dir.display());

        Self {
            config: config.clone(),
            store: Arc::new(DiskStorage::new(store_dir)),
            network: Arc::new(HttpNetwork::new(&config.origin)),
            registrations: RegistrationStore::new(),
            audit: AuditLog::new(config),
        }
    }

    fn worker_scope(&self, config: ScopeConfig) -> WorkerScope {
        WorkerScope::new(config, Arc::clone(&self.store), Arc::clone(&self.network))
            .with_audit(self.audit.clone())
    }

    /// A fresh worker version for a configured scope
    pub fn new_worker(&self, scope: &str) -> ScopeCacheResult<ServiceWorker> {
        let config = self.config.scope(scope)?.clone();
        Ok(ServiceWorker::new(self.worker_scope(config)))
    }

    /// Rebuild the registered worker for a scope.
    ///
    /// The registered cache name wins over the configured one: a version bump
    /// in the config does not take effect until it is installed.
    pub async fn restore_worker(&self, scope: &str) -> ScopeCacheResult<ServiceWorker> {
        let registration = self.registrations.get(scope).await?;
        let mut config = self.config.scope(scope)?.clone();
        if config.cache_name != registration.cache_name {
            debug!(
                "Scope {} registered with {}, configured {}",
                scope, registration.cache_name, config.cache_name
            );
            config.cache_name = registration.cache_name.clone();
        }

        Ok(ServiceWorker::restore(
            registration.worker_id,
            registration.state,
            self.worker_scope(config),
        ))
    }

    /// Mark the version recorded before `successor` took over as redundant.
    ///
    /// Returns the retired worker, or `None` when the record already belongs
    /// to `successor` or its version cannot become redundant.
    pub fn retire(
        &self,
        previous: &Registration,
        successor: &ServiceWorker,
    ) -> ScopeCacheResult<Option<ServiceWorker>> {
        if previous.worker_id == successor.id()
            || !previous.state.can_transition(WorkerState::Redundant)
        {
            return Ok(None);
        }

        let mut config = self.config.scope(&previous.scope)?.clone();
        config.cache_name = previous.cache_name.clone();
        let mut old = ServiceWorker::restore(
            previous.worker_id,
            previous.state,
            self.worker_scope(config),
        );
        old.supersede()?;
        info!(
            "Worker {} for {} superseded by {}",
            old.id(),
            previous.scope,
            successor.id()
        );
        Ok(Some(old))
    }

    /// Restore the worker for a scope and require it to be active
    pub async fn active_worker(&self, scope: &str) -> ScopeCacheResult<ServiceWorker> {
        let worker = self.restore_worker(scope).await?;
        if !worker.state().is_active() {
            return Err(ScopeCacheError::WorkerNotActive {
                scope: scope.to_string(),
                state: worker.state().to_string(),
            });
        }
        Ok(worker)
    }

    /// Scope paths to act on: one if given, else every configured scope
    pub fn target_scopes(&self, scope: Option<&str>) -> ScopeCacheResult<Vec<String>> {
        match scope {
            Some(scope) => Ok(vec![self.config.scope(scope)?.scope.clone()]),
            None => Ok(self.config.scopes.iter().map(|s| s.scope.clone()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_scopes_defaults_to_all() {
        let host = Host::new(&Config::default());
        assert_eq!(host.target_scopes(None).unwrap(), vec!["/", "/myapp/"]);
        assert_eq!(host.target_scopes(Some("/myapp/")).unwrap(), vec!["/myapp/"]);
        assert!(host.target_scopes(Some("/nope/")).is_err());
    }

    fn registration_of(worker: &ServiceWorker, state: WorkerState) -> Registration {
        let mut registration = Registration::for_worker(worker);
        registration.state = state;
        registration
    }

    #[test]
    fn retire_supersedes_previous_version() {
        let host = Host::new(&Config::default());
        let old = host.new_worker("/").unwrap();
        let new = host.new_worker("/").unwrap();

        let previous = registration_of(&old, WorkerState::Active);
        let retired = host.retire(&previous, &new).unwrap().unwrap();
        assert_eq!(retired.id(), old.id());
        assert_eq!(retired.state(), WorkerState::Redundant);
    }

    #[test]
    fn retire_skips_own_or_redundant_record() {
        let host = Host::new(&Config::default());
        let old = host.new_worker("/").unwrap();
        let new = host.new_worker("/").unwrap();

        let own = registration_of(&new, WorkerState::Active);
        assert!(host.retire(&own, &new).unwrap().is_none());

        let dead = registration_of(&old, WorkerState::Redundant);
        assert!(host.retire(&dead, &new).unwrap().is_none());
    }

    #[test]
    fn new_worker_uses_configured_cache() {
        let host = Host::new(&Config::default());
        let worker = host.new_worker("/myapp/").unwrap();
        assert_eq!(worker.scope().cache_name(), "myapp-site-cache-v1");
        assert!(worker.scope().config.evicts());
    }
}
