//! Per-worker execution scope
//!
//! Everything a handler may touch: the scope's configuration record, the
//! shared cache store, the network, and the audit log. Each worker version owns
//! its own scope, so two configurations can run side by side in one process.

use crate::audit::AuditLog;
use crate::config::ScopeConfig;
use crate::network::Network;
use crate::store::CacheStorage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct WorkerScope {
    pub config: ScopeConfig,
    pub store: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub audit: AuditLog,
    skip_waiting: AtomicBool,
}

impl WorkerScope {
    pub fn new(
        config: ScopeConfig,
        store: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            config,
            store,
            network,
            audit: AuditLog::disabled(),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Name of the cache this scope owns
    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    /// Ask to activate as soon as install settles
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    pub fn skipped_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for WorkerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerScope")
            .field("config", &self.config)
            .field("skip_waiting", &self.skipped_waiting())
            .finish_non_exhaustive()
    }
}
