//! End-to-end routing scenarios
//!
//! Drives an installed and activated controller through the request
//! classes the page actually issues, online and offline.

use std::sync::Arc;

use integration_tests::{basic, generation, origin, url, ScriptedNetwork};
use offline_cache::{
    CacheStorage, FetchEvent, FetchOutcome, Method, OfflineCacheController, Request,
    RequestMode, CACHE_VERSION,
};

async fn deployed(network: &Arc<ScriptedNetwork>) -> (OfflineCacheController, Arc<CacheStorage>) {
    let storage = Arc::new(CacheStorage::new(origin()));
    let ctrl = generation(CACHE_VERSION, &storage, network);
    ctrl.on_install().await.expect("install failed");
    ctrl.on_activate().await.expect("activate failed");
    (ctrl, storage)
}

fn get(path: &str) -> Request {
    Request::parse(&url(path), Method::Get).unwrap()
}

/// Scenario: GET /upload with the network down
#[tokio::test]
async fn test_upload_get_offline() {
    let network = ScriptedNetwork::serving_shell();
    let (ctrl, storage) = deployed(&network).await;
    network.set_offline(true);
    let before = storage.stats();

    let outcome = ctrl.on_fetch(FetchEvent::new(get("/upload"))).await;
    let resp = outcome.into_response().expect("claimed");

    assert_eq!(resp.status, 503);
    assert_eq!(&resp.body[..], b"Offline");
    assert_eq!(storage.stats(), before);
}

/// Scenario: GET /style.css, same-origin 200 basic, not cached yet
#[tokio::test]
async fn test_style_css_filled_on_miss() {
    let network = ScriptedNetwork::serving_shell();
    network.route("/style.css", basic("h1{}"));
    let (ctrl, storage) = deployed(&network).await;

    let resp = ctrl
        .on_fetch(FetchEvent::new(get("/style.css")))
        .await
        .into_response()
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(network.calls_to("/style.css"), 1);
    let bucket = storage.open(&ctrl.cache_name());
    assert!(bucket.match_request(&get("/style.css")).is_some());

    // served from the bucket from now on, even offline
    network.set_offline(true);
    let again = ctrl
        .on_fetch(FetchEvent::new(get("/style.css")))
        .await
        .into_response()
        .unwrap();
    assert_eq!(again, resp);
    assert_eq!(network.calls_to("/style.css"), 1);
}

/// The upload itself is a POST and is never intercepted
#[tokio::test]
async fn test_upload_post_passes_through() {
    let network = ScriptedNetwork::serving_shell();
    let (ctrl, _) = deployed(&network).await;
    let calls = network.total_calls();

    let post = Request::parse(&url("/upload"), Method::Post).unwrap();
    let outcome = ctrl.on_fetch(FetchEvent::new(post)).await;

    assert_eq!(outcome, FetchOutcome::PassThrough);
    assert_eq!(network.total_calls(), calls);
}

/// Going offline after the first visit still loads the app shell
#[tokio::test]
async fn test_offline_reload_serves_shell() {
    let network = ScriptedNetwork::serving_shell();
    let (ctrl, _) = deployed(&network).await;
    network.set_offline(true);

    let page = get("/").with_mode(RequestMode::Navigate);
    let doc = ctrl
        .on_fetch(FetchEvent::new(page))
        .await
        .into_response()
        .unwrap();
    assert_eq!(doc.status, 200);
    assert_eq!(&doc.body[..], b"/");

    for path in ["/output.css", "/favicon.svg", "/manifest.json"] {
        let resp = ctrl
            .on_fetch(FetchEvent::new(get(path)))
            .await
            .into_response()
            .unwrap();
        assert_eq!(&resp.body[..], path.as_bytes());
    }
}

/// Health probes report offline rather than serving the shell
#[tokio::test]
async fn test_health_probe_offline() {
    let network = ScriptedNetwork::serving_shell();
    let (ctrl, _) = deployed(&network).await;
    network.set_offline(true);

    let resp = ctrl
        .on_fetch(FetchEvent::new(get("/health")))
        .await
        .into_response()
        .unwrap();
    assert_eq!(resp.status, 503);
}
