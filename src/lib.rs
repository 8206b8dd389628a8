//! scopecache - scope-aware response cache lifecycle manager
//!
//! Pre-populates versioned named caches at install, sweeps caches outside a
//! whitelist at activation, and answers requests from cache with network
//! fallback. Each deployed scope is one [`worker::ServiceWorker`] driven by a
//! [`config::ScopeConfig`] record.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod network;
pub mod store;
pub mod ui;
pub mod worker;

pub use error::{ScopeCacheError, ScopeCacheResult};
