//! Subcommand implementations. Each returns the text to print.

use std::fmt::Write as _;
use std::path::Path;

use offline_cache::{
    classify, CacheConfig, CacheStorage, Method, Origin, Request, RequestClass, RequestMode,
};
use tracing::debug;
use url::Url;

use crate::error::{CliError, CliResult};

/// Routing policy applied to a class, in words
pub fn policy(class: RequestClass) -> &'static str {
    match class {
        RequestClass::Api => "network-only, 503 when offline, never cached",
        RequestClass::PdfContent => "network-only, never cached, no offline fallback",
        RequestClass::Navigation => "network-first, cached root document when offline",
        RequestClass::StaticAsset => "cache-first, filled on miss, cached index when offline",
    }
}

/// `manifest` subcommand
pub fn manifest(config: &CacheConfig, json: bool) -> CliResult<String> {
    if json {
        let doc = serde_json::json!({
            "origin": config.origin.serialize(),
            "cache": config.cache_name(),
            "version": config.version,
            "precache": config.precache,
            "api_prefixes": config.api_prefixes,
            "navigation_fallback": config.navigation_fallback,
            "asset_fallback": config.asset_fallback,
        });
        return Ok(serde_json::to_string_pretty(&doc)?);
    }

    let mut out = String::new();
    writeln!(out, "origin:   {}", config.origin)?;
    writeln!(out, "cache:    {}", config.cache_name())?;
    writeln!(out, "api:      {}", config.api_prefixes.join(", "))?;
    writeln!(out, "precache:")?;
    for path in &config.precache {
        writeln!(out, "  {}", path)?;
    }
    Ok(out)
}

/// `classify` subcommand
pub fn classify_request(
    config: &CacheConfig,
    url: &str,
    method: &str,
    accept: Option<&str>,
    navigate: bool,
) -> CliResult<String> {
    let method: Method = method.parse().map_err(CliError::Method)?;
    let mut request = Request::new(Url::parse(url)?, method);
    if let Some(accept) = accept {
        request = request.with_header("accept", accept);
    }
    if navigate {
        request = request.with_mode(RequestMode::Navigate);
    }

    if method != Method::Get {
        return Ok(format!("{} {} -> pass-through", method, request.url));
    }
    let class = classify(&request, config);
    debug!(url = %request.url, %class, "classified");
    Ok(format!("{} {} -> {} ({})", method, request.url, class, policy(class)))
}

/// `inspect` subcommand
pub fn inspect(origin: Origin, snapshot: &Path) -> CliResult<String> {
    let bytes = std::fs::read(snapshot)?;
    let storage = CacheStorage::from_snapshot(origin, &bytes)?;

    let mut out = String::new();
    for name in storage.keys() {
        let cache = storage.open(&name);
        writeln!(out, "{} ({} entries)", name, cache.len())?;
        for key in cache.keys() {
            let request = Request::new(Url::parse(&key.url)?, key.method);
            if let Some(response) = cache.match_request(&request) {
                writeln!(
                    out,
                    "  {} {} {} {}B",
                    key.method,
                    key.url,
                    response.status,
                    response.body.len()
                )?;
            }
        }
    }
    Ok(out)
}
