//! Network fetch backends
//!
//! The worker treats the network as a black box fallback: given a request it
//! either produces a response (any status) or fails with a transport error.

use crate::config::schema::OriginConfig;
use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::{CachedResponse, Request};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Abstract network fetch interface
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request from the network
    async fn fetch(&self, request: &Request) -> ScopeCacheResult<CachedResponse>;
}

/// Network backend performing real HTTP requests against an origin
pub struct HttpNetwork {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpNetwork {
    /// Create a backend for the configured origin
    pub fn new(origin: &OriginConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(origin.timeout_secs)))
            .build()
            .into();

        Self {
            base_url: origin.base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Resolve a request URL against the origin
    ///
    /// Absolute `http(s)://` URLs pass through unchanged.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> ScopeCacheResult<CachedResponse> {
        let url = self.resolve(&request.url);
        let key = request.url.clone();
        let agent = self.agent.clone();

        debug!("GET {}", url);
        tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url, key))
            .await
            .map_err(|e| ScopeCacheError::Internal(format!("fetch task failed: {}", e)))?
    }
}

fn fetch_blocking(agent: &ureq::Agent, url: &str, key: String) -> ScopeCacheResult<CachedResponse> {
    let mut response = agent
        .get(url)
        .call()
        .map_err(|e| ScopeCacheError::network(url, e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| ScopeCacheError::network(url, e.to_string()))?;

    Ok(CachedResponse {
        url: key,
        status,
        headers,
        body,
    })
}

/// Canned network used by tests
///
/// Unknown URLs answer 404; URLs marked with [`StaticNetwork::fail`] produce a
/// transport error. Every call is recorded.
#[derive(Default)]
pub struct StaticNetwork {
    responses: HashMap<String, CachedResponse>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StaticNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a 200 response with the given body
    pub fn route(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), CachedResponse::new(url, 200, body));
        self
    }

    /// Serve an arbitrary response
    pub fn route_response(mut self, response: CachedResponse) -> Self {
        self.responses.insert(response.url.clone(), response);
        self
    }

    /// Make requests for `url` fail at the transport level
    pub fn fail(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// URLs requested so far, in order
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Network for StaticNetwork {
    async fn fetch(&self, request: &Request) -> ScopeCacheResult<CachedResponse> {
        self.calls.lock().await.push(request.url.clone());

        if self.failing.contains(&request.url) {
            return Err(ScopeCacheError::network(&request.url, "connection refused"));
        }

        Ok(self
            .responses
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| CachedResponse::new(&request.url, 404, "Not Found")))
    }
}
