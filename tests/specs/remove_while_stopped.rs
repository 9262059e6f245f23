//! S6: removing an application that was created but never started succeeds,
//! tolerating the internal `ApplicationNotStarted` the remove path's implicit
//! stop attempt would otherwise surface.

use crate::common::*;

#[tokio::test]
async fn removing_a_never_started_application_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let backend = native_backend(store, dir.path());
    let client = start_engine(backend).await;

    let app = native_application("svc", "1.0.0", &sleep_argv());
    let tag = app.tag.clone();
    client.create_application(app).await.expect("create");

    client.remove_application(tag.clone()).await.expect("remove without ever starting");

    let (tags, _cursor) = client
        .list_applications(fleet_core::ListApplicationsOption::default())
        .await
        .expect("list");
    assert!(tags.iter().all(|t| t.name != tag.name));
}
