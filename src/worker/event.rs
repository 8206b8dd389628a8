//! Lifecycle events and their extension handles
//!
//! Handlers run synchronously against a [`LifecycleEvent`] and hand deferred
//! work back through two extensions:
//!
//! - [`LifecycleEvent::wait_until`] extends the event's lifetime until the
//!   future settles. The dispatcher awaits every registered future jointly.
//! - [`LifecycleEvent::respond_with`] commits a fetch event to exactly one
//!   response, produced by the given future.

use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::{CachedResponse, Request};
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;

/// Cross-context message payload
pub type MessageData = serde_json::Value;

/// Deferred response registered by `respond_with`
pub type ResponseFuture = BoxFuture<'static, ScopeCacheResult<CachedResponse>>;

/// Kinds of events a worker consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Message,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Activate => write!(f, "activate"),
            Self::Fetch => write!(f, "fetch"),
            Self::Message => write!(f, "message"),
        }
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Install,
    Activate,
    Fetch(Request),
    Message(MessageData),
}

/// An event dispatched to a worker
pub struct LifecycleEvent {
    payload: Payload,
    lifetime: Vec<BoxFuture<'static, ()>>,
    response: Option<ResponseFuture>,
}

impl LifecycleEvent {
    fn with_payload(payload: Payload) -> Self {
        Self {
            payload,
            lifetime: vec![],
            response: None,
        }
    }

    pub fn install() -> Self {
        Self::with_payload(Payload::Install)
    }

    pub fn activate() -> Self {
        Self::with_payload(Payload::Activate)
    }

    pub fn fetch(request: Request) -> Self {
        Self::with_payload(Payload::Fetch(request))
    }

    pub fn message(data: MessageData) -> Self {
        Self::with_payload(Payload::Message(data))
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            Payload::Install => EventKind::Install,
            Payload::Activate => EventKind::Activate,
            Payload::Fetch(_) => EventKind::Fetch,
            Payload::Message(_) => EventKind::Message,
        }
    }

    /// Request descriptor of a fetch event
    pub fn request(&self) -> Option<&Request> {
        match &self.payload {
            Payload::Fetch(request) => Some(request),
            _ => None,
        }
    }

    /// Payload of a message event
    pub fn data(&self) -> Option<&MessageData> {
        match &self.payload {
            Payload::Message(data) => Some(data),
            _ => None,
        }
    }

    /// Extend the event's lifetime until `work` settles
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.lifetime.push(Box::pin(work));
    }

    /// Commit a fetch event to the response produced by `response`
    pub fn respond_with<F>(&mut self, response: F) -> ScopeCacheResult<()>
    where
        F: Future<Output = ScopeCacheResult<CachedResponse>> + Send + 'static,
    {
        if self.kind() != EventKind::Fetch {
            return Err(ScopeCacheError::InvalidEventState(format!(
                "respond_with called on a {} event",
                self.kind()
            )));
        }
        if self.response.is_some() {
            return Err(ScopeCacheError::InvalidEventState(
                "respond_with called more than once".to_string(),
            ));
        }
        self.response = Some(Box::pin(response));
        Ok(())
    }

    /// Number of futures registered through `wait_until`
    pub fn pending(&self) -> usize {
        self.lifetime.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<BoxFuture<'static, ()>>, Option<ResponseFuture>) {
        (self.lifetime, self.response)
    }
}

impl fmt::Debug for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEvent")
            .field("payload", &self.payload)
            .field("pending", &self.lifetime.len())
            .field("responded", &self.response.is_some())
            .finish()
    }
}
