// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_core::Application;

#[test]
fn load_of_missing_snapshot_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checkpointer = Checkpointer::new(dir.path().join("snapshot.json"));
    assert!(checkpointer.load().expect("load").is_none());
}

#[test]
fn checkpoint_then_load_round_trips_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checkpointer = Checkpointer::new(dir.path().join("snapshot.json"));

    let mut state = StoreState::default();
    let app = Application::builder().name("svc").version("1.0.0").build();
    state.applications.insert(app.tag.tag(), app);

    checkpointer.checkpoint_sync(5, &state).expect("checkpoint");
    let loaded = checkpointer.load().expect("load").expect("present");

    assert_eq!(loaded.seq, 5);
    assert_eq!(loaded.state.applications.len(), 1);
}

#[test]
fn second_checkpoint_rotates_previous_to_bak() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("snapshot.json");
    let checkpointer = Checkpointer::new(&path);

    checkpointer.checkpoint_sync(1, &StoreState::default()).expect("checkpoint 1");
    checkpointer.checkpoint_sync(2, &StoreState::default()).expect("checkpoint 2");

    assert!(path.exists());
    assert!(path.with_extension("bak").exists());
}
