//! End-to-end lifecycle scenarios against the in-memory store

use scopecache::config::schema::{MYAPP_CACHE_NAME, ROOT_CACHE_NAME};
use scopecache::config::ScopeConfig;
use scopecache::network::StaticNetwork;
use scopecache::store::{CacheStorage, MemoryStorage, Request};
use scopecache::worker::{ServiceWorker, WorkerScope, WorkerState, PURGE_CACHE_ACTION};
use serde_json::json;
use std::sync::Arc;

fn site() -> StaticNetwork {
    StaticNetwork::new()
        .route("/", "<h1>root</h1>")
        .route("/other.html", "<h1>other</h1>")
        .route("/missing.html", "<h1>live</h1>")
}

fn worker(config: ScopeConfig, store: &Arc<MemoryStorage>, network: &Arc<StaticNetwork>) -> ServiceWorker {
    ServiceWorker::new(WorkerScope::new(config, store.clone(), network.clone()))
}

fn root_scope() -> ScopeConfig {
    ScopeConfig::new("/", ROOT_CACHE_NAME).with_manifest(["/", "/other.html"])
}

#[tokio::test]
async fn installed_manifest_is_served_without_network() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());
    let mut w = worker(root_scope(), &store, &network);
    w.deploy().await.unwrap();
    let install_calls = network.calls().await.len();

    for url in ["/", "/other.html"] {
        let response = w.handle_fetch(Request::new(url)).await.unwrap();
        assert_eq!(response.status, 200);
    }
    assert_eq!(network.calls().await.len(), install_calls);
}

#[tokio::test]
async fn miss_falls_back_to_network_without_caching() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());
    let mut w = worker(root_scope(), &store, &network);
    w.deploy().await.unwrap();

    assert!(store
        .match_in(ROOT_CACHE_NAME, "/missing.html")
        .await
        .unwrap()
        .is_none());

    let response = w.handle_fetch(Request::new("/missing.html")).await.unwrap();
    assert_eq!(response.body, b"<h1>live</h1>");
    assert_eq!(network.calls().await.last().unwrap(), "/missing.html");
    assert_eq!(
        store.entries(ROOT_CACHE_NAME).await.unwrap(),
        vec!["/", "/other.html"]
    );
}

#[tokio::test]
async fn activation_sweeps_caches_outside_whitelist() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());
    store.open("OLD_CACHE").await.unwrap();
    store.open(MYAPP_CACHE_NAME).await.unwrap();

    let mut w = worker(ScopeConfig::myapp(), &store, &network);
    w.install().await.unwrap();
    assert!(store.has("OLD_CACHE").await.unwrap());

    w.activate().await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec![MYAPP_CACHE_NAME]);
}

#[tokio::test]
async fn sub_scope_activation_keeps_root_cache() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());

    let mut root = worker(root_scope(), &store, &network);
    root.deploy().await.unwrap();
    store.open("myapp-site-cache-v0").await.unwrap();

    let mut myapp = worker(ScopeConfig::myapp(), &store, &network);
    myapp.deploy().await.unwrap();

    assert_eq!(
        store.keys().await.unwrap(),
        vec![ROOT_CACHE_NAME, MYAPP_CACHE_NAME]
    );
    // Root worker still answers from its cache.
    let response = root.handle_fetch(Request::new("/")).await.unwrap();
    assert_eq!(response.body, b"<h1>root</h1>");
}

#[tokio::test]
async fn root_activation_never_evicts() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());
    store.open("OLD_CACHE").await.unwrap();

    let mut w = worker(root_scope(), &store, &network);
    w.deploy().await.unwrap();

    assert!(store.has("OLD_CACHE").await.unwrap());
}

#[tokio::test]
async fn purge_command_deletes_own_cache_only() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());
    store.open("other-v1").await.unwrap();

    let mut w = worker(root_scope(), &store, &network);
    w.deploy().await.unwrap();

    w.post_message(json!("hello")).await.unwrap();
    w.post_message(json!({"title": "Notification with Data"})).await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["other-v1", ROOT_CACHE_NAME]);

    w.post_message(json!(PURGE_CACHE_ACTION)).await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["other-v1"]);

    // After a purge every request goes to the network.
    let response = w.handle_fetch(Request::new("/")).await.unwrap();
    assert_eq!(response.body, b"<h1>root</h1>");
    assert_eq!(network.calls().await.last().unwrap(), "/");
}

#[tokio::test]
async fn reinstalling_same_version_does_not_duplicate() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());

    let mut first = worker(root_scope(), &store, &network);
    first.install().await.unwrap();
    let mut second = worker(root_scope(), &store, &network);
    second.install().await.unwrap();

    assert_eq!(
        store.entries(ROOT_CACHE_NAME).await.unwrap(),
        vec!["/", "/other.html"]
    );
}

#[tokio::test]
async fn failed_population_leaves_cache_empty_but_activates() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site().fail("/other.html"));

    let mut w = worker(root_scope(), &store, &network);
    w.deploy().await.unwrap();

    assert_eq!(w.state(), WorkerState::Active);
    assert!(store.entries(ROOT_CACHE_NAME).await.unwrap().is_empty());
}

#[tokio::test]
async fn version_bump_creates_distinct_cache() {
    let store = Arc::new(MemoryStorage::new());
    let network = Arc::new(site());

    let mut v1 = worker(ScopeConfig::new("/a/", "a-v1").with_manifest(["/"]), &store, &network);
    v1.deploy().await.unwrap();

    let v2_config = ScopeConfig::new("/a/", "a-v2")
        .with_manifest(["/", "/other.html"])
        .with_whitelist(["a-v2"]);
    let mut v2 = worker(v2_config, &store, &network);
    v2.install().await.unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["a-v1", "a-v2"]);

    v2.activate().await.unwrap();
    v1.supersede().unwrap();
    assert_eq!(store.keys().await.unwrap(), vec!["a-v2"]);
    assert_eq!(v1.state(), WorkerState::Redundant);
}
