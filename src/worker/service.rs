//! One worker version and its lifecycle

use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::{CachedResponse, Request};
use crate::worker::dispatch::{expect_response, DispatchTable};
use crate::worker::event::{LifecycleEvent, MessageData};
use crate::worker::scope::WorkerScope;
use crate::worker::state::WorkerState;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// A cache lifecycle manager bound to one scope configuration
#[derive(Debug)]
pub struct ServiceWorker {
    id: Uuid,
    scope: Arc<WorkerScope>,
    table: DispatchTable,
    state: WorkerState,
}

impl ServiceWorker {
    /// Create a new, uninstalled worker using the standard handlers
    pub fn new(scope: WorkerScope) -> Self {
        Self::with_table(scope, DispatchTable::standard())
    }

    /// Create a new, uninstalled worker with a custom dispatch table
    pub fn with_table(scope: WorkerScope, table: DispatchTable) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope: Arc::new(scope),
            table,
            state: WorkerState::Uninstalled,
        }
    }

    /// Rebuild a previously registered worker in a known state
    pub fn restore(id: Uuid, state: WorkerState, scope: WorkerScope) -> Self {
        Self {
            id,
            scope: Arc::new(scope),
            table: DispatchTable::standard(),
            state,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn scope(&self) -> &WorkerScope {
        &self.scope
    }

    fn transition(&mut self, to: WorkerState) -> ScopeCacheResult<()> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    fn ensure_active(&self) -> ScopeCacheResult<()> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(ScopeCacheError::WorkerNotActive {
                scope: self.scope.config.scope.clone(),
                state: self.state.to_string(),
            })
        }
    }

    /// Dispatch the install event and wait for its gated work.
    ///
    /// Ends in `Installed` when the handler skipped waiting, `Waiting`
    /// otherwise. A handler error makes the worker redundant.
    pub async fn install(&mut self) -> ScopeCacheResult<()> {
        self.transition(WorkerState::Installing)?;

        if let Err(e) = self
            .table
            .dispatch(LifecycleEvent::install(), &self.scope)
            .await
        {
            self.state = WorkerState::Redundant;
            return Err(e);
        }

        self.transition(WorkerState::Installed)?;
        if !self.scope.skipped_waiting() {
            self.transition(WorkerState::Waiting)?;
        }

        info!(
            "Worker {} for {} is {}",
            self.id, self.scope.config.scope, self.state
        );
        Ok(())
    }

    /// Dispatch the activate event and take control of the scope
    pub async fn activate(&mut self) -> ScopeCacheResult<()> {
        self.transition(WorkerState::Activating)?;

        if let Err(e) = self
            .table
            .dispatch(LifecycleEvent::activate(), &self.scope)
            .await
        {
            warn!("Activate handler for {} failed: {}", self.scope.config.scope, e);
        }

        self.transition(WorkerState::Active)?;
        info!("Worker {} controls {}", self.id, self.scope.config.scope);
        self.scope
            .audit
            .log(
                crate::audit::events::WORKER_ACTIVATED,
                &serde_json::json!({
                    "scope": self.scope.config.scope,
                    "cache": self.scope.cache_name(),
                    "worker": self.id,
                }),
            )
            .await;
        Ok(())
    }

    /// Install then activate
    pub async fn deploy(&mut self) -> ScopeCacheResult<()> {
        self.install().await?;
        self.activate().await
    }

    /// Answer an intercepted request.
    ///
    /// Falls back to a plain network fetch when no handler responded.
    pub async fn handle_fetch(&self, request: Request) -> ScopeCacheResult<CachedResponse> {
        self.ensure_active()?;

        let outcome = self
            .table
            .dispatch(LifecycleEvent::fetch(request.clone()), &self.scope)
            .await?;

        match expect_response(outcome) {
            Some(response) => response,
            None => self.scope.network.fetch(&request).await,
        }
    }

    /// Deliver a cross-context message
    pub async fn post_message(&self, data: MessageData) -> ScopeCacheResult<()> {
        self.ensure_active()?;
        self.table
            .dispatch(LifecycleEvent::message(data), &self.scope)
            .await?;
        Ok(())
    }

    /// Mark this version as replaced by a newer one
    pub fn supersede(&mut self) -> ScopeCacheResult<()> {
        self.transition(WorkerState::Redundant)
    }
}
