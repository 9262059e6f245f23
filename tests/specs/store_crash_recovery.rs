//! S7 (ambient): a checkpoint plus uncheckpointed writes both survive a
//! reopen of the store engine against the same directory, simulating a crash
//! between the last checkpoint and process exit.

use fleet_core::{Application, ApplicationTag, BackendKind, Store};
use fleet_storage::StoreEngine;

fn app(name: &str) -> Application {
    Application {
        tag: ApplicationTag::new(name, "1"),
        labels: std::collections::HashMap::new(),
        env: std::collections::HashMap::new(),
        backend: BackendKind::Native,
        cluster_spec: None,
        native_spec: None,
    }
}

#[test]
fn a_reopened_store_recovers_checkpointed_and_uncheckpointed_writes() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let store = StoreEngine::open(dir.path()).expect("open store");
        store.add_application(&app("a")).expect("add a");
        store.add_application(&app("b")).expect("add b");
        store.add_application(&app("c")).expect("add c");
        store.checkpoint().expect("checkpoint");

        store.add_application(&app("d")).expect("add d");
        // No checkpoint here: `d` only exists in the WAL when the process
        // ends, as if the daemon had been killed before its next checkpoint.
    }

    let store = StoreEngine::open(dir.path()).expect("reopen store");
    let (tags, _cursor) = store.list_applications(10, "").expect("list");
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

    for expected in ["a", "b", "c", "d"] {
        assert!(names.contains(&expected), "missing {expected} after reopen: {names:?}");
    }
}
