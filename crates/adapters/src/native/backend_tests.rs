use std::sync::Arc;

use fleet_core::{Application, BackendError, ListApplicationsOption, Store};
use fleet_storage::StoreEngine;
use tempfile::tempdir;
use tokio::sync::mpsc;

use super::*;

fn new_backend() -> (NativeBackend, tempfile::TempDir, tempfile::TempDir) {
    let store_dir = tempdir().expect("store tempdir");
    let base_dir = tempdir().expect("base tempdir");
    let store: Arc<dyn Store> = Arc::new(StoreEngine::open(store_dir.path()).expect("open store"));
    let backend = NativeBackend::with_base_dir(store, base_dir.path().to_path_buf());
    (backend, store_dir, base_dir)
}

async fn init(backend: &NativeBackend) -> mpsc::Receiver<Task> {
    let (tx, rx) = mpsc::channel(64);
    backend.init(tx).await.expect("init");
    rx
}

#[tokio::test]
async fn start_without_a_spec_fails_with_application_no_existed() {
    let (backend, _s, _b) = new_backend();
    let _rx = init(&backend).await;
    let err = backend
        .start_application(ApplicationTag::new("missing", "1"))
        .await
        .expect_err("no spec");
    assert!(matches!(err, BackendError::ApplicationNoExisted));
}

#[tokio::test]
async fn second_start_of_the_same_name_is_rejected() {
    let (backend, _s, _b) = new_backend();
    let mut rx = init(&backend).await;

    let app = Application::builder().name("svc").version("1").native_command(&["sleep", "5"]).build();
    backend.create_application(app.clone()).await.expect("create");
    backend.start_application(app.tag.clone()).await.expect("start");

    let err = backend
        .start_application(ApplicationTag::new("svc", "2"))
        .await
        .expect_err("second start rejected");
    assert!(matches!(err, BackendError::ApplicationStarted));

    // Drain the fire-and-forget RunApplication task the download spawn posts.
    let task = rx.recv().await.expect("run-application task");
    if let Task::Internal(internal) = task {
        backend.handle_internal(internal).await.expect("run application");
    }
}

#[tokio::test]
async fn stop_of_an_unstarted_name_is_not_started() {
    let (backend, _s, _b) = new_backend();
    let _rx = init(&backend).await;
    let err = backend
        .stop_application(ApplicationTag::new("svc", "1"))
        .await
        .expect_err("never started");
    assert!(matches!(err, BackendError::ApplicationNotStarted));
}

#[tokio::test]
async fn start_then_stop_reaches_a_running_process_and_tears_it_down() {
    let (backend, _s, _b) = new_backend();
    let mut rx = init(&backend).await;

    let app = Application::builder().name("svc").version("1").native_command(&["sleep", "30"]).build();
    backend.create_application(app.clone()).await.expect("create");
    backend.start_application(app.tag.clone()).await.expect("start");

    let task = rx.recv().await.expect("run-application task");
    if let Task::Internal(internal) = task {
        backend.handle_internal(internal).await.expect("run application");
    }

    let states = backend.get_application_states(vec![app.tag.clone()]).await.expect("states");
    assert!(states[0].is_started);
    assert_eq!(states[0].instances.len(), 1);
    assert!(states[0].instances[0].running);

    backend.stop_application(app.tag.clone()).await.expect("stop");
    let states = backend.get_application_states(vec![app.tag.clone()]).await.expect("states after stop");
    assert!(!states[0].is_started);
}

#[tokio::test]
async fn download_failure_for_a_torn_down_instance_is_a_no_op() {
    let (backend, _s, _b) = new_backend();
    let app = Application::builder().name("svc").version("1").native_command(&["sleep", "1"]).build();
    // No create_application / start_application: the instance was never
    // registered, matching the "already handled" stale-event case.
    backend.handle_download_failed(app).await.expect("no-op");
}

#[tokio::test]
async fn list_and_config_roundtrip() {
    let (backend, _s, _b) = new_backend();
    let _rx = init(&backend).await;

    let app = Application::builder().name("svc").version("1").native_command(&["true"]).build();
    backend.create_application(app.clone()).await.expect("create");
    let (tags, _cursor) = backend
        .list_applications(ListApplicationsOption { size: 10, cursor: String::new() })
        .await
        .expect("list");
    assert_eq!(tags, vec![app.tag.clone()]);

    let config = fleet_core::Config {
        name: "settings".into(),
        labels: Default::default(),
        data: std::collections::HashMap::from([("a".to_string(), "1".to_string())]),
    };
    backend.create_config(config.clone()).await.expect("create config");
    backend.remove_config(config.name).await.expect("remove config");
}
