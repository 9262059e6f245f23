//! S2: simulate a daemon restart by re-bootstrapping the engine against the
//! same store and basePath — the survivor instance is reclaimed by pid.

use crate::common::*;

#[tokio::test]
async fn bootstrap_reclaims_a_surviving_instance_by_pid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let backend = native_backend(store.clone(), dir.path());
    let client = start_engine(backend).await;

    let app = native_application("svc", "1.0.0", &sleep_argv());
    let tag = app.tag.clone();
    client.create_application(app).await.expect("create");
    client.start_application(tag.clone()).await.expect("start");

    let before = client.get_application_states(vec![tag.clone()]).await.expect("states");
    assert!(before[0].is_started);

    // Re-open the store and construct a fresh backend/engine against the
    // same basePath, as a new process would after a restart. The original
    // backend's in-memory slot map is gone, but the spawned process is
    // still alive and the runtime record still carries its pid.
    let store = open_store(dir.path());
    let backend = native_backend(store, dir.path());
    let client = start_engine(backend).await;

    let after = client.get_application_states(vec![tag.clone()]).await.expect("states after restart");
    assert!(after[0].is_started, "bootstrap should have reclaimed the running process");
    assert!(after[0].instances.iter().any(|i| i.running));
}
