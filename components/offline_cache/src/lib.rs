//! Offline cache controller for the GridPrint web client
//!
//! Intercepts the page's network requests, routes each one by class (API,
//! PDF content, navigation, static asset), keeps a single versioned cache
//! bucket and falls back to cached or synthetic responses when offline.

pub mod cache;
pub mod classify;
pub mod config;
pub mod contract;
pub mod controller;
pub mod error;
pub mod event;
pub mod http;
pub mod network;
pub mod origin;

// Re-export main types
pub use cache::{Cache, CacheStats, CacheStorage};
pub use classify::{classify, RequestClass};
pub use config::{CacheConfig, HostCapabilities, CACHE_VERSION, PRECACHE_URLS};
pub use controller::{
    global, register_global, ActivationReport, ControllerState, EventOutcome, InstallReport,
    OfflineCacheController,
};
pub use error::{CacheError, ContractError, ControllerError, InstallError, NetworkError};
pub use event::{EventKind, FetchEvent, FetchOutcome, LifecycleEvent, PreloadSender};
pub use http::{CacheKey, Method, Request, RequestMode, Response, ResponseType};
pub use network::Network;
#[cfg(feature = "http-client")]
pub use network::HttpNetwork;
pub use origin::{Origin, OriginError};
