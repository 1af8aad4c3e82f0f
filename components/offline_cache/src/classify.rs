//! Request classification.
//!
//! Every intercepted request falls into exactly one class. The tests run
//! in a fixed order: API, PDF content, navigation, then static asset as the
//! catch-all.

use std::fmt;

use crate::config::{CacheConfig, PDF_EXTENSION, PDF_MEDIA_TYPE};
use crate::http::Request;

/// Routing class of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Same-origin backend endpoint, network-only
    Api,
    /// PDF document, network-only and never cached
    PdfContent,
    /// Full-page navigation, network-first
    Navigation,
    /// Everything else, cache-first
    StaticAsset,
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestClass::Api => write!(f, "api"),
            RequestClass::PdfContent => write!(f, "pdf"),
            RequestClass::Navigation => write!(f, "navigation"),
            RequestClass::StaticAsset => write!(f, "static-asset"),
        }
    }
}

/// Classify a request against the deployment configuration
pub fn classify(request: &Request, config: &CacheConfig) -> RequestClass {
    let path = request.url.path();

    let same_origin = config.origin.contains(&request.url);
    if same_origin && config.api_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return RequestClass::Api;
    }

    if path.ends_with(PDF_EXTENSION) || request.accept().contains(PDF_MEDIA_TYPE) {
        return RequestClass::PdfContent;
    }

    if request.is_navigation() {
        return RequestClass::Navigation;
    }

    RequestClass::StaticAsset
}
