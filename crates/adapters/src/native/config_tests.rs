use std::collections::HashMap;

use tempfile::tempdir;

use super::*;

#[test]
fn materialize_writes_each_key_as_a_file() {
    let base = tempdir().expect("tempdir");
    let data = HashMap::from([("a.toml".to_string(), "x=1".to_string())]);
    materialize(base.path(), "settings", &data).expect("materialize");

    let written = std::fs::read_to_string(base.path().join("config/settings/a.toml")).expect("read back");
    assert_eq!(written, "x=1");
}

#[test]
fn remove_is_idempotent_on_a_missing_directory() {
    let base = tempdir().expect("tempdir");
    assert!(remove(base.path(), "never-existed").is_ok());
}

#[test]
fn remove_deletes_the_config_directory() {
    let base = tempdir().expect("tempdir");
    materialize(base.path(), "settings", &HashMap::from([("k".to_string(), "v".to_string())]))
        .expect("materialize");
    remove(base.path(), "settings").expect("remove");
    assert!(!base.path().join("config/settings").exists());
}
