//! The offline cache controller.
//!
//! One controller exists per worker generation. It owns the current cache
//! bucket and answers three signals: install (precache the app shell),
//! activate (purge stale buckets, take control) and fetch (route one
//! request). Network failures inside fetch routing are always converted
//! into a fallback response.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures_util::future::try_join_all;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheStorage};
use crate::classify::{classify, RequestClass};
use crate::config::CacheConfig;
use crate::error::{ControllerError, InstallError};
use crate::event::{FetchEvent, FetchOutcome, LifecycleEvent};
use crate::http::{CacheKey, Method, Request, Response, ResponseType};
use crate::network::Network;

// ============================================================================
// Controller State
// ============================================================================

/// Controller lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Constructed, install not attempted yet
    Uninstalled,
    /// Install started; stays here when an install attempt fails
    Installing,
    /// Precache complete, ready to activate
    InstalledWaiting,
    /// Purged stale buckets and controlling pages
    Active,
}

impl ControllerState {
    /// Check if this state allows fetch interception
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, ControllerState::Active)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Uninstalled => write!(f, "uninstalled"),
            ControllerState::Installing => write!(f, "installing"),
            ControllerState::InstalledWaiting => write!(f, "installed-waiting"),
            ControllerState::Active => write!(f, "active"),
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Bucket that received the manifest
    pub cache_name: String,
    /// Number of manifest entries stored
    pub precached: usize,
    /// Asks the host to activate without waiting for old clients to close
    pub skip_waiting: bool,
}

/// Result of a successful activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// The bucket that remains
    pub cache_name: String,
    /// Stale buckets that were deleted
    pub deleted: Vec<String>,
    /// Whether navigation preload was enabled
    pub navigation_preload: bool,
    /// Asks the host to take control of open pages immediately
    pub clients_claimed: bool,
}

/// Result of dispatching a [`LifecycleEvent`]
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Fetched(FetchOutcome),
}

// ============================================================================
// Controller
// ============================================================================

/// Mediates every request of the page through the routing policy
pub struct OfflineCacheController {
    config: CacheConfig,
    storage: Arc<CacheStorage>,
    network: Arc<dyn Network>,
    state: RwLock<ControllerState>,
    navigation_preload: AtomicBool,
}

impl OfflineCacheController {
    /// Create a controller for one worker generation
    pub fn new(config: CacheConfig, storage: Arc<CacheStorage>, network: Arc<dyn Network>) -> Self {
        Self {
            config,
            storage,
            network,
            state: RwLock::new(ControllerState::Uninstalled),
            navigation_preload: AtomicBool::new(false),
        }
    }

    /// Get the current state
    pub fn state(&self) -> ControllerState {
        *self.state.read()
    }

    fn set_state(&self, new_state: ControllerState) {
        let mut state = self.state.write();
        let old_state = *state;
        if old_state != new_state {
            *state = new_state;
            info!(from = %old_state, to = %new_state, "controller state change");
        }
    }

    /// Deployment configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cache storage shared with other generations
    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// Name of the bucket this generation owns
    pub fn cache_name(&self) -> String {
        self.config.cache_name()
    }

    /// Whether activation enabled navigation preload
    pub fn navigation_preload_enabled(&self) -> bool {
        self.navigation_preload.load(Ordering::SeqCst)
    }

    fn current_cache(&self) -> Arc<Cache> {
        self.storage.open(&self.config.cache_name())
    }

    /// Route an event to its handler
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<EventOutcome, ControllerError> {
        debug!(event = %event.kind(), "dispatch");
        match event {
            LifecycleEvent::Install => self.on_install().await.map(EventOutcome::Installed),
            LifecycleEvent::Activate => self.on_activate().await.map(EventOutcome::Activated),
            LifecycleEvent::Fetch(event) => Ok(EventOutcome::Fetched(self.on_fetch(event).await)),
        }
    }

    // ------------------------------------------------------------------------
    // Install
    // ------------------------------------------------------------------------

    /// Precache the manifest into the current bucket.
    ///
    /// Every manifest entry must fetch with a 2xx status; otherwise nothing
    /// is stored and the controller stays `Installing` until the host
    /// retries.
    pub async fn on_install(&self) -> Result<InstallReport, ControllerError> {
        let actual = self.state();
        if actual == ControllerState::Active {
            return Err(ControllerError::InvalidState {
                expected: "not active",
                actual,
            });
        }
        self.set_state(ControllerState::Installing);

        let cache_name = self.config.cache_name();
        let cache = self.current_cache();
        info!(cache = %cache_name, entries = self.config.precache.len(), "precaching");

        let batch = match self.precache().await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(cache = %cache_name, error = %err, "install failed");
                return Err(err.into());
            }
        };
        let precached = batch.len();
        cache.put_all(batch).map_err(InstallError::from)?;

        self.set_state(ControllerState::InstalledWaiting);
        Ok(InstallReport {
            cache_name,
            precached,
            skip_waiting: true,
        })
    }

    async fn precache(&self) -> Result<Vec<(CacheKey, Response)>, InstallError> {
        let requests = self
            .config
            .precache
            .iter()
            .map(|path| {
                self.config
                    .origin
                    .join(path)
                    .map(Request::get)
                    .map_err(|e| InstallError::InvalidUrl(format!("{}: {}", path, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = requests.iter().map(|request| async move {
            let response =
                self.network
                    .fetch(request)
                    .await
                    .map_err(|source| InstallError::Fetch {
                        url: request.url.to_string(),
                        source,
                    })?;
            if !response.ok() {
                return Err(InstallError::BadStatus {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            Ok((request.cache_key(), response))
        });

        try_join_all(fetches).await
    }

    // ------------------------------------------------------------------------
    // Activate
    // ------------------------------------------------------------------------

    /// Delete every bucket except the current one and take control.
    pub async fn on_activate(&self) -> Result<ActivationReport, ControllerError> {
        let actual = self.state();
        if actual != ControllerState::InstalledWaiting {
            return Err(ControllerError::InvalidState {
                expected: "installed-waiting",
                actual,
            });
        }

        let cache_name = self.config.cache_name();
        let mut deleted = Vec::new();
        for name in self.storage.keys() {
            if name != cache_name && self.storage.delete(&name) {
                info!(cache = %name, "deleted stale cache");
                deleted.push(name);
            }
        }

        let navigation_preload = self.config.host.navigation_preload;
        self.navigation_preload
            .store(navigation_preload, Ordering::SeqCst);

        self.set_state(ControllerState::Active);
        Ok(ActivationReport {
            cache_name,
            deleted,
            navigation_preload,
            clients_claimed: true,
        })
    }

    // ------------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------------

    /// Whether a request would be claimed. Decided without any I/O.
    pub fn intercepts(&self, request: &Request) -> bool {
        self.state().can_intercept_fetch() && request.method == Method::Get
    }

    /// Route one request. Non-GET requests, and any request reaching a
    /// controller that is not active, pass through untouched.
    pub async fn on_fetch(&self, event: FetchEvent) -> FetchOutcome {
        if !self.intercepts(&event.request) {
            debug!(method = %event.request.method, url = %event.request.url, "pass through");
            return FetchOutcome::PassThrough;
        }

        let class = classify(&event.request, &self.config);
        debug!(url = %event.request.url, %class, "routing");

        let response = match class {
            RequestClass::Api => self.api(&event.request).await,
            RequestClass::PdfContent => self.pdf(&event.request).await,
            RequestClass::Navigation => self.navigation(event).await,
            RequestClass::StaticAsset => self.static_asset(&event.request).await,
        };
        FetchOutcome::Respond(response)
    }

    /// Network-only, synthetic 503 when offline
    async fn api(&self, request: &Request) -> Response {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %request.url, error = %err, "api request offline");
                Response::offline()
            }
        }
    }

    /// Network-only, failures surface as a network error
    async fn pdf(&self, request: &Request) -> Response {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %request.url, error = %err, "pdf request failed");
                Response::network_error()
            }
        }
    }

    /// Network-first with the cached root document as fallback
    async fn navigation(&self, mut event: FetchEvent) -> Response {
        let live = match event.preload_response().await {
            Ok(Some(preloaded)) => Ok(preloaded),
            Ok(None) => self.network.fetch(&event.request).await,
            Err(err) => Err(err),
        };
        match live {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %event.request.url, error = %err, "navigation offline, using fallback");
                self.fallback(&self.config.navigation_fallback)
            }
        }
    }

    /// Cache-first with fill-on-miss
    async fn static_asset(&self, request: &Request) -> Response {
        if let Some(cached) = self.storage.match_request(request) {
            debug!(url = %request.url, "cache hit");
            return cached;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if self.is_cacheable(request, &response) {
                    if let Err(err) = self.current_cache().put(request, response.clone()) {
                        debug!(url = %request.url, error = %err, "cache write dropped");
                    }
                }
                response
            }
            Err(err) => {
                warn!(url = %request.url, error = %err, "asset offline, using fallback");
                self.fallback(&self.config.asset_fallback)
            }
        }
    }

    /// Only same-origin, 200, basic responses are stored
    fn is_cacheable(&self, request: &Request, response: &Response) -> bool {
        self.config.origin.contains(&request.url)
            && response.status == 200
            && response.response_type == ResponseType::Basic
    }

    /// Cached copy of `path` from the current bucket, or the offline 503
    fn fallback(&self, path: &str) -> Response {
        self.config
            .origin
            .join(path)
            .ok()
            .and_then(|url| self.current_cache().match_url(&url))
            .unwrap_or_else(Response::offline)
    }
}

impl fmt::Debug for OfflineCacheController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineCacheController")
            .field("cache_name", &self.config.cache_name())
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Process-wide controller
// ============================================================================

static GLOBAL: OnceLock<Arc<OfflineCacheController>> = OnceLock::new();

/// Register the controller for this worker process. Only one may exist.
pub fn register_global(
    controller: OfflineCacheController,
) -> Result<Arc<OfflineCacheController>, ControllerError> {
    let controller = Arc::new(controller);
    GLOBAL
        .set(Arc::clone(&controller))
        .map_err(|_| ControllerError::AlreadyRegistered)?;
    Ok(controller)
}

/// The controller registered for this process, if any
pub fn global() -> Option<Arc<OfflineCacheController>> {
    GLOBAL.get().cloned()
}
