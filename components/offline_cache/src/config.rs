//! Deployment constants for the offline cache controller.
//!
//! The precache manifest and the API prefix allowlist are compiled in and
//! change only with a new deployment. Bumping [`CACHE_VERSION`] yields a
//! new bucket name, which makes the next activation purge the old bucket.

use crate::contract::{HEALTH_PATH, UPLOAD_PATH};
use crate::origin::Origin;

/// Version string embedded in the bucket name
pub const CACHE_VERSION: &str = "2025-09-02-v1";

/// Prefix shared by every bucket this controller creates
pub const CACHE_PREFIX: &str = "gridprint-static";

/// App shell fetched and stored at install time
pub const PRECACHE_URLS: &[&str] = &[
    "/",
    "/index.html",
    "/output.css",
    "/favicon.svg",
    "/manifest.json",
    "/icons/android-chrome-192x192.png",
    "/icons/android-chrome-512x512.png",
    "/icons/apple-touch-icon.png",
];

/// Same-origin path prefixes that are always network-only
pub const API_PREFIXES: &[&str] = &[UPLOAD_PATH, HEALTH_PATH];

/// Served to offline navigations
pub const NAVIGATION_FALLBACK: &str = "/";

/// Served to offline static asset requests
pub const ASSET_FALLBACK: &str = "/index.html";

/// Path suffix that marks PDF content
pub const PDF_EXTENSION: &str = ".pdf";

/// Media type that marks PDF content in `Accept`
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// What the hosting runtime can do for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Whether navigation preload can be enabled on activation
    pub navigation_preload: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            navigation_preload: true,
        }
    }
}

/// Configuration of one controller generation
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Origin the controller is installed on
    pub origin: Origin,
    /// Version embedded in the bucket name
    pub version: String,
    /// Paths fetched at install
    pub precache: Vec<String>,
    /// Network-only path prefixes
    pub api_prefixes: Vec<String>,
    /// Cached document served to offline navigations
    pub navigation_fallback: String,
    /// Cached document served to offline asset requests
    pub asset_fallback: String,
    /// Host capabilities
    pub host: HostCapabilities,
}

impl CacheConfig {
    /// The compiled deployment for `origin`
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            version: CACHE_VERSION.to_string(),
            precache: PRECACHE_URLS.iter().map(|s| s.to_string()).collect(),
            api_prefixes: API_PREFIXES.iter().map(|s| s.to_string()).collect(),
            navigation_fallback: NAVIGATION_FALLBACK.to_string(),
            asset_fallback: ASSET_FALLBACK.to_string(),
            host: HostCapabilities::default(),
        }
    }

    /// Replace the version string
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Replace the precache manifest
    pub fn with_precache<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the API prefix allowlist
    pub fn with_api_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the host capabilities
    pub fn with_host(mut self, host: HostCapabilities) -> Self {
        self.host = host;
        self
    }

    /// Name of the current bucket
    pub fn cache_name(&self) -> String {
        format!("{}-{}", CACHE_PREFIX, self.version)
    }
}
