//! S8: with `FLEETD_NATIVE_BASE_DIR` set, `NativeBackend::new` (the
//! environment-driven constructor, not the test-only `with_base_dir`) creates
//! per-instance directories under that path.

use std::sync::Arc;

use fleet_adapters::NativeBackend;
use serial_test::serial;

use crate::common::*;

#[tokio::test]
#[serial(native_base_dir_env)]
async fn native_base_dir_follows_the_environment_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let override_dir = tempfile::tempdir().expect("override tempdir");
    std::env::set_var("FLEETD_NATIVE_BASE_DIR", override_dir.path());

    let store = open_store(dir.path());
    let backend: Arc<dyn fleet_adapters::Backend> = Arc::new(NativeBackend::new(store));
    let client = start_engine(backend).await;

    let app = native_application("svc", "1.0.0", &sleep_argv());
    let tag = app.tag.clone();
    client.create_application(app).await.expect("create");
    client.start_application(tag.clone()).await.expect("start");

    let states = wait_for(|| async {
        let states = client.get_application_states(vec![tag.clone()]).await.expect("states");
        states[0].is_started.then_some(states)
    })
    .await;
    assert!(states[0].instances.iter().any(|i| i.running));

    let instance_dir = override_dir.path().join("svc").join("1.0.0");
    assert!(instance_dir.exists(), "expected an instance directory under the overridden base dir");

    client.stop_application(tag).await.expect("stop");
    std::env::remove_var("FLEETD_NATIVE_BASE_DIR");
}
