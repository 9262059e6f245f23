use std::collections::HashMap;

use fleet_core::{Application, ApplicationTag, BackendKind, NativeAppSpec};
use tempfile::tempdir;

use super::*;

fn app_with_command(argv: &[&str]) -> Application {
    Application {
        tag: ApplicationTag::new("svc", "1.0.0"),
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

#[tokio::test]
async fn start_spawns_and_reports_a_live_pid() {
    let dir = tempdir().expect("tempdir");
    let app = app_with_command(&["sleep", "5"]);
    let instance = Instance::start(app.tag.clone(), dir.path().to_path_buf(), &app)
        .await
        .expect("spawn sleep");

    assert!(instance.pid() > 0);
    assert!(instance.is_alive());
    instance.stop().await;
}

#[tokio::test]
async fn stop_cancels_the_token_and_kills_the_child() {
    let dir = tempdir().expect("tempdir");
    let app = app_with_command(&["sleep", "5"]);
    let instance = Instance::start(app.tag.clone(), dir.path().to_path_buf(), &app)
        .await
        .expect("spawn sleep");

    instance.stop().await;
    assert!(instance.cancel.is_cancelled());
}

#[test]
fn bind_fails_for_a_pid_that_is_not_alive() {
    let dir = tempdir().expect("tempdir");
    // pid 1 belongs to init and is never owned by us, but an unused high
    // pid is far more likely to be free in any sandbox; either way a
    // non-existent pid must fail to bind.
    let result = Instance::bind(ApplicationTag::new("svc", "1.0.0"), dir.path().to_path_buf(), i32::MAX - 1);
    assert!(result.is_err());
}

#[test]
fn argv0_resolves_against_instance_dir_when_present() {
    let dir = tempdir().expect("tempdir");
    let bin_path = dir.path().join("svc");
    std::fs::write(&bin_path, b"#!/bin/sh\n").expect("write stub binary");

    let resolved = resolve_argv0(dir.path(), "svc");
    assert_eq!(resolved, bin_path.to_string_lossy());
}

#[test]
fn argv0_falls_back_to_verbatim_when_absent() {
    let dir = tempdir().expect("tempdir");
    assert_eq!(resolve_argv0(dir.path(), "svc"), "svc");
}

#[test]
fn build_env_prepends_instance_dir_to_path() {
    let dir = tempdir().expect("tempdir");
    let env = build_env(dir.path(), &HashMap::new());
    let path = env.iter().find(|(k, _)| k == "PATH").map(|(_, v)| v.clone()).expect("PATH present");
    assert!(path.starts_with(&dir.path().to_string_lossy().into_owned()));
}
