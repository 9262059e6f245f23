//! S1: create, start, observe running, stop — the native backend's full
//! lifecycle round trip through the client facade.

use crate::common::*;

#[tokio::test]
async fn native_application_runs_then_stops_cleanly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let backend = native_backend(store, dir.path());
    let client = start_engine(backend).await;

    let app = native_application("svc", "1.0.0", &sleep_argv());
    let tag = app.tag.clone();

    client.create_application(app).await.expect("create");
    client.start_application(tag.clone()).await.expect("start");

    let states = client.get_application_states(vec![tag.clone()]).await.expect("states");
    assert!(states[0].is_started);
    assert!(states[0].instances.iter().any(|i| i.running));

    client.stop_application(tag.clone()).await.expect("stop");

    let states = client.get_application_states(vec![tag.clone()]).await.expect("states after stop");
    assert!(!states[0].is_started);
    assert!(states[0].instances.is_empty());
}
