use std::sync::Arc;

use fleet_adapters::FakeBackend;
use fleet_core::{Application, ApplicationTag, EngineError, Store};
use fleet_storage::StoreEngine;

use super::*;
use crate::dispatcher;

fn new_client() -> Client {
    let dir = tempfile::tempdir().expect("tempdir");
    let store: Arc<dyn Store> = Arc::new(StoreEngine::open(dir.path()).expect("open store"));
    let backend: Arc<dyn fleet_adapters::Backend> = Arc::new(FakeBackend::new(store));
    let tx = dispatcher::spawn(backend, dispatcher::queue_capacity());
    Client::new(tx)
}

#[tokio::test]
async fn empty_tag_is_param_invalid() {
    let client = new_client();
    let err = client.start_application(ApplicationTag::new("", "1")).await.expect_err("empty name");
    assert!(matches!(err, EngineError::ParamInvalid));
}

#[tokio::test]
async fn full_lifecycle_round_trip() {
    let client = new_client();
    let app = Application::builder().name("svc").version("1").build();

    client.create_application(app.clone()).await.expect("create");
    client.start_application(app.tag.clone()).await.expect("start");

    let states = client.get_application_states(vec![app.tag.clone()]).await.expect("states");
    assert!(states[0].is_started);

    client.stop_application(app.tag.clone()).await.expect("stop");
    let err = client.stop_application(app.tag.clone()).await.expect_err("already stopped");
    assert!(err.is_application_not_started());
}

#[tokio::test]
async fn remove_application_tolerates_a_never_started_application() {
    let client = new_client();
    let app = Application::builder().name("svc").version("1").build();
    client.create_application(app.clone()).await.expect("create");
    client.remove_application(app.tag).await.expect("remove succeeds without a prior start");
}

#[tokio::test]
async fn list_applications_returns_the_last_tag_as_the_next_cursor() {
    let client = new_client();
    let app = Application::builder().name("svc").version("1").build();
    client.create_application(app.clone()).await.expect("create");

    let (tags, cursor) = client
        .list_applications(fleet_core::ListApplicationsOption { size: 10, cursor: String::new() })
        .await
        .expect("list");
    assert_eq!(tags, vec![app.tag.clone()]);
    assert_eq!(cursor, app.tag.tag());
}
