//! Cache lifecycle manager
//!
//! A worker owns one versioned named cache and reacts to four events:
//!
//! | Event | Behavior |
//! |-------|----------|
//! | install | skip waiting; fetch the manifest into the cache as one batch |
//! | activate | with a whitelist, delete every other cache on the origin |
//! | fetch | serve from the cache, fall back to the network, never write back |
//! | message | `"purge_cache"` deletes the worker's own cache |
//!
//! Root and sub-scope deployments are the same component with different
//! [`ScopeConfig`](crate::config::ScopeConfig) records.

pub mod dispatch;
pub mod event;
pub mod handlers;
pub mod registration;
mod scope;
mod service;
pub mod state;

pub use dispatch::{DispatchTable, Handler, Outcome};
pub use event::{EventKind, LifecycleEvent, MessageData};
pub use handlers::PURGE_CACHE_ACTION;
pub use registration::{Registration, RegistrationStore};
pub use scope::WorkerScope;
pub use service::ServiceWorker;
pub use state::WorkerState;
