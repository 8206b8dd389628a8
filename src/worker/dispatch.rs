//! Event dispatch table
//!
//! Maps each [`EventKind`] to a handler. The table is built once when a worker
//! is created; dispatching runs the handler synchronously and then awaits the
//! deferred work it registered.

use crate::error::ScopeCacheResult;
use crate::store::CachedResponse;
use crate::worker::event::{EventKind, LifecycleEvent};
use crate::worker::handlers;
use crate::worker::scope::WorkerScope;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Event handler signature
pub type Handler = fn(&mut LifecycleEvent, &Arc<WorkerScope>) -> ScopeCacheResult<()>;

/// Result of dispatching one event
#[derive(Debug)]
pub enum Outcome {
    /// No handler was registered for the event kind
    Unhandled,
    /// Handler ran and all `wait_until` work settled
    Settled,
    /// Handler called `respond_with`; carries the settled response
    Responded(ScopeCacheResult<CachedResponse>),
}

#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<EventKind, Handler>,
}

impl DispatchTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table wired to the cache lifecycle handlers
    pub fn standard() -> Self {
        Self::new()
            .on(EventKind::Install, handlers::on_install)
            .on(EventKind::Activate, handlers::on_activate)
            .on(EventKind::Fetch, handlers::on_fetch)
            .on(EventKind::Message, handlers::on_message)
    }

    /// Register (or replace) the handler for an event kind
    pub fn on(mut self, kind: EventKind, handler: Handler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Run the handler for `event`, then await its deferred work.
    ///
    /// The response future and the lifetime futures are driven concurrently;
    /// dispatch returns once all of them have settled.
    pub async fn dispatch(
        &self,
        mut event: LifecycleEvent,
        scope: &Arc<WorkerScope>,
    ) -> ScopeCacheResult<Outcome> {
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            debug!("No {} handler registered", kind);
            return Ok(Outcome::Unhandled);
        };

        handler(&mut event, scope)?;

        let (lifetime, response) = event.into_parts();
        let (_, response) = futures_util::join!(join_all(lifetime), async move {
            match response {
                Some(response) => Some(response.await),
                None => None,
            }
        });

        Ok(match response {
            Some(response) => Outcome::Responded(response),
            None => Outcome::Settled,
        })
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<String> = self.handlers.keys().map(ToString::to_string).collect();
        kinds.sort();
        f.debug_struct("DispatchTable").field("handlers", &kinds).finish()
    }
}

/// Reject a handler outcome that is not a response
pub(crate) fn expect_response(outcome: Outcome) -> Option<ScopeCacheResult<CachedResponse>> {
    match outcome {
        Outcome::Responded(response) => Some(response),
        Outcome::Settled | Outcome::Unhandled => None,
    }
}
