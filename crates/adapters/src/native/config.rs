// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native config materialization (§4.5): each config blob is written to
//! `{base}/config/{name}/{k}`.

use std::path::{Path, PathBuf};

fn config_dir(base: &Path, name: &str) -> PathBuf {
    base.join("config").join(name)
}

pub fn materialize(base: &Path, name: &str, data: &std::collections::HashMap<String, String>) -> std::io::Result<()> {
    let dir = config_dir(base, name);
    std::fs::create_dir_all(&dir)?;
    for (key, value) in data {
        std::fs::write(dir.join(key), value)?;
    }
    Ok(())
}

pub fn remove(base: &Path, name: &str) -> std::io::Result<()> {
    let dir = config_dir(base, name);
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
