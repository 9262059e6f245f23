//! Shared fixtures for workspace-level integration tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use fleet_adapters::NativeBackend;
use fleet_core::{Application, ApplicationTag, BackendKind, NativeAppSpec, Store};
use fleet_engine::Client;
use fleet_storage::StoreEngine;

pub fn open_store(dir: &Path) -> Arc<dyn Store> {
    Arc::new(StoreEngine::open(dir.join("db")).expect("open store"))
}

pub fn native_backend(store: Arc<dyn Store>, base_dir: &Path) -> Arc<dyn fleet_adapters::Backend> {
    Arc::new(NativeBackend::with_base_dir(store, base_dir.to_path_buf()))
}

pub async fn start_engine(backend: Arc<dyn fleet_adapters::Backend>) -> Client {
    fleet_engine::start(backend).await.expect("engine starts")
}

pub fn native_application(name: &str, version: &str, argv: &[&str]) -> Application {
    Application {
        tag: ApplicationTag::new(name, version),
        labels: HashMap::new(),
        env: HashMap::new(),
        backend: BackendKind::Native,
        cluster_spec: None,
        native_spec: Some(NativeAppSpec {
            resource: None,
            command: argv.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

pub fn sleep_argv() -> Vec<&'static str> {
    vec!["/bin/sleep", "30"]
}

/// Polls `check` until it returns `Some`, or panics after a few seconds.
/// Used where a backend's outcome is only visible after an async monitor or
/// download task re-enters the dispatcher.
pub async fn wait_for<F, Fut, T>(mut check: F) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Option<T>>,
{
    for _ in 0..100 {
        if let Some(value) = check().await {
            return value;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("condition was never satisfied within the deadline");
}
