//! Integration test suite for the GridPrint offline cache
//!
//! Provides a scripted network and a deployment harness shared by the
//! scenario tests, which drive the controller only through its public API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use offline_cache::{
    CacheConfig, CacheStorage, Network, NetworkError, OfflineCacheController, Origin, Request,
    Response, ResponseType, PRECACHE_URLS,
};
use parking_lot::Mutex;

/// Origin every scenario runs on
pub const ORIGIN: &str = "https://gridprint.app";

/// Absolute URL for a path on [`ORIGIN`]
pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

/// The scenario origin
pub fn origin() -> Origin {
    Origin::parse(ORIGIN).expect("valid origin")
}

/// A same-origin 200 `basic` response
pub fn basic(body: &str) -> Response {
    Response::new(200, body.to_string()).with_type(ResponseType::Basic)
}

/// Network answering from a fixed route table, with an offline switch
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
    total: AtomicUsize,
}

impl ScriptedNetwork {
    /// Serves the app shell; each body is its own path
    pub fn serving_shell() -> Arc<Self> {
        let network = Arc::new(Self::default());
        for path in PRECACHE_URLS {
            network.route(path, basic(path));
        }
        network
    }

    /// Answer GETs of `path` with `response`
    pub fn route(&self, path: &str, response: Response) {
        self.routes.lock().insert(url(path), response);
    }

    /// Toggle connectivity
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Total fetches attempted
    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Fetches attempted for `path`
    pub fn calls_to(&self, path: &str) -> usize {
        let target = url(path);
        self.calls.lock().iter().filter(|u| **u == target).count()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(request.url.to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Offline);
        }
        Ok(self
            .routes
            .lock()
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(404, "").with_type(ResponseType::Basic)))
    }
}

/// A controller generation sharing `storage` and `network`
pub fn generation(
    version: &str,
    storage: &Arc<CacheStorage>,
    network: &Arc<ScriptedNetwork>,
) -> OfflineCacheController {
    let network: Arc<dyn Network> = network.clone();
    OfflineCacheController::new(
        CacheConfig::new(origin()).with_version(version),
        Arc::clone(storage),
        network,
    )
}
