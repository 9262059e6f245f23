// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the same `FLEETD_STATE_DIR` the daemon uses, so the demo CLI
//! reads and writes the store the running daemon persists to.

use std::path::PathBuf;

pub fn state_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("FLEETD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = dirs::state_dir() {
        return Ok(dir.join("fleetd"));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not determine a state directory; set FLEETD_STATE_DIR"))?;
    Ok(home.join(".local/state/fleetd"))
}
