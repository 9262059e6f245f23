//! S3: the download server returns a body whose MD5 differs from the
//! resource spec — the application never starts and the runtime's error is
//! diagnostic rather than generic.

use fleet_core::ResourceSpec;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

#[tokio::test]
async fn mismatched_digest_leaves_the_application_stopped_with_a_specific_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not the bytes you expected".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(dir.path());
    let backend = native_backend(store, dir.path());
    let client = start_engine(backend).await;

    let mut app = native_application("svc", "1.0.0", &sleep_argv());
    app.native_spec.as_mut().expect("native spec").resource = Some(ResourceSpec {
        url: server.uri(),
        file_name: "payload".to_string(),
        md5: "0".repeat(32),
    });
    let tag = app.tag.clone();

    client.create_application(app).await.expect("create");
    client.start_application(tag.clone()).await.expect("start");

    let states = wait_for(|| async {
        let states = client.get_application_states(vec![tag.clone()]).await.expect("states");
        (!states[0].is_started).then_some(states)
    })
    .await;

    assert!(states[0].instances.is_empty());
    assert!(
        states[0].err.contains("file md5 not match"),
        "expected a specific md5 mismatch error, got: {}",
        states[0].err
    );
}
