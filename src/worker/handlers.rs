//! Install, activate, fetch and message handlers
//!
//! Handlers are plain functions of `(event, scope)`. They never block: any
//! store or network work is handed to the event through `wait_until` or
//! `respond_with`, and failures inside that work are logged, not returned.

use crate::audit::events;
use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::{CachedResponse, Request};
use crate::worker::event::{LifecycleEvent, MessageData};
use crate::worker::scope::WorkerScope;
use futures_util::future::{join_all, try_join_all};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Message payload that deletes the scope's own cache
pub const PURGE_CACHE_ACTION: &str = "purge_cache";

/// Install: skip waiting, then pre-populate the scope's cache from its manifest
pub fn on_install(event: &mut LifecycleEvent, scope: &Arc<WorkerScope>) -> ScopeCacheResult<()> {
    info!("{} worker installing...", scope.config.scope);
    scope.skip_waiting();

    let scope = Arc::clone(scope);
    event.wait_until(async move {
        match precache(&scope).await {
            Ok(count) => {
                info!("Cached {} manifest entries in {}", count, scope.cache_name());
                scope
                    .audit
                    .log(
                        events::WORKER_INSTALLED,
                        &json!({
                            "scope": scope.config.scope,
                            "cache": scope.cache_name(),
                            "entries": count,
                        }),
                    )
                    .await;
            }
            Err(e) => {
                error!("Error installing {} worker: {}", scope.config.scope, e);
                scope
                    .audit
                    .log(
                        events::WORKER_INSTALL_FAILED,
                        &json!({
                            "scope": scope.config.scope,
                            "cache": scope.cache_name(),
                            "error": e.to_string(),
                        }),
                    )
                    .await;
            }
        }
    });
    Ok(())
}

/// Open the scope's cache and store every manifest entry as one batch.
///
/// Any failed fetch or non-2xx response fails the whole batch before anything
/// is written.
pub async fn precache(scope: &WorkerScope) -> ScopeCacheResult<usize> {
    let name = scope.cache_name();
    scope.store.open(name).await?;

    let fetches = scope.config.manifest.iter().map(|url| async move {
        let response = scope.network.fetch(&Request::new(url.clone())).await?;
        if !response.is_ok() {
            return Err(ScopeCacheError::BadManifestResponse {
                url: url.clone(),
                status: response.status,
            });
        }
        Ok::<_, ScopeCacheError>((url.clone(), response))
    });
    let entries = try_join_all(fetches).await?;

    let count = entries.len();
    scope.store.put_all(name, entries).await?;
    Ok(count)
}

/// Activate: sweep caches outside the whitelist, if the scope has one
pub fn on_activate(event: &mut LifecycleEvent, scope: &Arc<WorkerScope>) -> ScopeCacheResult<()> {
    info!("{} worker activating...", scope.config.scope);
    if !scope.config.evicts() {
        return Ok(());
    }

    let scope = Arc::clone(scope);
    event.wait_until(async move {
        evict_stale(&scope).await;
    });
    Ok(())
}

/// Delete every cache not retained by the scope's whitelist.
///
/// Deletions run concurrently and are joined once. A failed deletion is logged
/// and skipped, as is a cache that was already gone. Returns the names this
/// sweep actually removed.
pub async fn evict_stale(scope: &WorkerScope) -> Vec<String> {
    let names = match scope.store.keys().await {
        Ok(names) => names,
        Err(e) => {
            warn!("Could not list caches for eviction: {}", e);
            return vec![];
        }
    };

    let retained = scope.config.retained_caches();
    let stale: Vec<String> = names
        .into_iter()
        .filter(|name| !retained.contains(name.as_str()))
        .collect();

    let results = join_all(stale.iter().map(|name| scope.store.delete(name))).await;

    let mut evicted = vec![];
    for (name, result) in stale.into_iter().zip(results) {
        match result {
            Ok(true) => {
                debug!("Evicted cache {}", name);
                evicted.push(name);
            }
            Ok(false) => debug!("Cache {} was already gone", name),
            Err(e) => warn!("Failed to evict cache {}: {}", name, e),
        }
    }

    if !evicted.is_empty() {
        info!("Evicted {} stale cache(s)", evicted.len());
        scope
            .audit
            .log(
                events::CACHE_EVICTED,
                &json!({"scope": scope.config.scope, "caches": evicted}),
            )
            .await;
    }
    evicted
}

/// Fetch: answer from the scope's cache, falling back to the network
pub fn on_fetch(event: &mut LifecycleEvent, scope: &Arc<WorkerScope>) -> ScopeCacheResult<()> {
    let request = event
        .request()
        .cloned()
        .ok_or_else(|| ScopeCacheError::InvalidEventState("fetch event without request".into()))?;
    debug!("{} fetching: {}", scope.config.scope, request.url);

    let scope = Arc::clone(scope);
    event.respond_with(async move { respond_from_cache(&scope, &request).await })
}

/// Cache lookup with network fallback; network results are not stored
pub async fn respond_from_cache(
    scope: &WorkerScope,
    request: &Request,
) -> ScopeCacheResult<CachedResponse> {
    match scope.store.match_in(scope.cache_name(), request.key()).await? {
        Some(hit) => {
            debug!("Match found in {} for: {}", scope.cache_name(), request.url);
            Ok(hit)
        }
        None => {
            debug!("No match in {} found for: {}", scope.cache_name(), request.url);
            scope.network.fetch(request).await
        }
    }
}

/// Message: purge the scope's own cache on the purge command, ignore the rest
pub fn on_message(event: &mut LifecycleEvent, scope: &Arc<WorkerScope>) -> ScopeCacheResult<()> {
    if !is_purge_command(event.data()) {
        debug!("Ignoring message for {}", scope.config.scope);
        return Ok(());
    }

    let scope = Arc::clone(scope);
    event.wait_until(async move {
        purge(&scope).await;
    });
    Ok(())
}

pub fn is_purge_command(data: Option<&MessageData>) -> bool {
    matches!(data, Some(MessageData::String(s)) if s == PURGE_CACHE_ACTION)
}

/// Delete the scope's own cache; `None` if the deletion failed
pub async fn purge(scope: &WorkerScope) -> Option<bool> {
    match scope.store.delete(scope.cache_name()).await {
        Ok(removed) => {
            info!("{} cache removal status: {}", scope.cache_name(), removed);
            scope
                .audit
                .log(
                    events::CACHE_PURGED,
                    &json!({"cache": scope.cache_name(), "removed": removed}),
                )
                .await;
            Some(removed)
        }
        Err(e) => {
            warn!("{} cache removal error: {}", scope.cache_name(), e);
            None
        }
    }
}
