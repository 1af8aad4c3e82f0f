//! Deployment upgrade and persistence tests
//!
//! A new deployment installs next to the old bucket, then takes over on
//! activation. Storage survives a restart through a snapshot.

use std::sync::Arc;

use integration_tests::{basic, generation, origin, url, ScriptedNetwork};
use offline_cache::{
    global, register_global, CacheStorage, ControllerError, ControllerState, FetchEvent, Method,
    Request, CACHE_VERSION,
};

#[tokio::test]
async fn test_upgrade_keeps_old_bucket_until_activation() {
    let network = ScriptedNetwork::serving_shell();
    let storage = Arc::new(CacheStorage::new(origin()));

    let old = generation(CACHE_VERSION, &storage, &network);
    old.on_install().await.unwrap();
    old.on_activate().await.unwrap();

    network.route("/output.css", basic("v2 styles"));
    let new = generation("2025-10-01-v1", &storage, &network);
    let report = new.on_install().await.unwrap();
    assert!(report.skip_waiting);
    assert_eq!(new.state(), ControllerState::InstalledWaiting);
    assert_eq!(storage.keys().len(), 2);

    let report = new.on_activate().await.unwrap();
    assert_eq!(report.deleted, vec![old.cache_name()]);
    assert_eq!(storage.keys(), vec![new.cache_name()]);

    let css = Request::parse(&url("/output.css"), Method::Get).unwrap();
    let resp = new
        .on_fetch(FetchEvent::new(css))
        .await
        .into_response()
        .unwrap();
    assert_eq!(&resp.body[..], b"v2 styles");
}

#[tokio::test]
async fn test_failed_upgrade_leaves_old_generation_serving() {
    let network = ScriptedNetwork::serving_shell();
    let storage = Arc::new(CacheStorage::new(origin()));
    let old = generation(CACHE_VERSION, &storage, &network);
    old.on_install().await.unwrap();
    old.on_activate().await.unwrap();

    network.set_offline(true);
    let new = generation("2025-10-01-v1", &storage, &network);
    assert!(matches!(
        new.on_install().await,
        Err(ControllerError::Install(_))
    ));
    assert_eq!(new.state(), ControllerState::Installing);

    let css = Request::parse(&url("/output.css"), Method::Get).unwrap();
    let resp = old
        .on_fetch(FetchEvent::new(css))
        .await
        .into_response()
        .unwrap();
    assert_eq!(&resp.body[..], b"/output.css");
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let network = ScriptedNetwork::serving_shell();
    let storage = Arc::new(CacheStorage::new(origin()));
    let ctrl = generation(CACHE_VERSION, &storage, &network);
    ctrl.on_install().await.unwrap();
    ctrl.on_activate().await.unwrap();

    let bytes = storage.to_snapshot().unwrap();
    let restored = Arc::new(CacheStorage::from_snapshot(origin(), &bytes).unwrap());
    assert_eq!(restored.keys(), vec![ctrl.cache_name()]);

    network.set_offline(true);
    let calls = network.total_calls();
    let css = Request::parse(&url("/output.css"), Method::Get).unwrap();
    assert!(restored.match_request(&css).is_some());
    assert_eq!(network.total_calls(), calls);
}

#[tokio::test]
async fn test_single_process_controller() {
    let network = ScriptedNetwork::serving_shell();
    let storage = Arc::new(CacheStorage::new(origin()));

    let registered = register_global(generation(CACHE_VERSION, &storage, &network)).unwrap();
    registered.on_install().await.unwrap();
    assert!(Arc::ptr_eq(&registered, &global().unwrap()));

    let second = register_global(generation(CACHE_VERSION, &storage, &network));
    assert!(matches!(second, Err(ControllerError::AlreadyRegistered)));
}
