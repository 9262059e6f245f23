// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native backend configuration resolved from the environment (§6.1).

use std::path::PathBuf;
use std::time::Duration;

fn state_dir() -> PathBuf {
    if let Ok(raw) = std::env::var("FLEETD_STATE_DIR") {
        return PathBuf::from(raw);
    }
    dirs::state_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fleetd")
}

/// Root directory under which per-application instance directories and
/// downloaded resources are materialized.
pub fn base_dir() -> PathBuf {
    std::env::var("FLEETD_NATIVE_BASE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join("native"))
}

/// Poll interval for the per-instance liveness monitor.
pub fn liveness_poll_interval() -> Duration {
    let ms: u64 = std::env::var("FLEETD_LIVENESS_POLL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    Duration::from_millis(ms)
}
