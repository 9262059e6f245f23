//! S5: starting a second version of a running name is rejected; once the
//! first is stopped, the second succeeds, and a stale event naming the first
//! version must not flip `isStarted` back.

use crate::common::*;

#[tokio::test]
async fn a_running_version_blocks_a_second_start_of_the_same_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let backend = native_backend(store, dir.path());
    let client = start_engine(backend).await;

    let v1 = native_application("svc", "1", &sleep_argv());
    let v2 = native_application("svc", "2", &sleep_argv());
    let tag1 = v1.tag.clone();
    let tag2 = v2.tag.clone();

    client.create_application(v1).await.expect("create v1");
    client.start_application(tag1.clone()).await.expect("start v1");

    client.create_application(v2).await.expect("create v2");
    let err = client.start_application(tag2.clone()).await.unwrap_err();
    assert!(matches!(err, fleet_core::EngineError::Backend(fleet_core::BackendError::ApplicationStarted)));

    client.stop_application(tag1).await.expect("stop v1");
    client.start_application(tag2.clone()).await.expect("start v2 after v1 stops");

    let states = client.get_application_states(vec![tag2]).await.expect("states");
    assert!(states[0].is_started);
}
