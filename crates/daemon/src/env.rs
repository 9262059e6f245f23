// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::error::DaemonError;

/// Resolve the state directory: `FLEETD_STATE_DIR` > `XDG_STATE_HOME/fleetd` > `~/.local/state/fleetd`.
pub fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("FLEETD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = dirs::state_dir() {
        return Ok(dir.join("fleetd"));
    }
    let home = dirs::home_dir().ok_or(DaemonError::NoStateDir)?;
    Ok(home.join(".local/state/fleetd"))
}

/// Resolve the single-instance lock path: `FLEETD_LOCK_PATH` > `{state_dir}/fleetd.lock`.
pub fn lock_path(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("FLEETD_LOCK_PATH").map(PathBuf::from).unwrap_or_else(|_| state_dir.join("fleetd.lock"))
}
