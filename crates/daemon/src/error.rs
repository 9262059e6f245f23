// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup-time error taxonomy: everything that can keep the daemon from
//! reaching "ready".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine a state directory; set FLEETD_STATE_DIR")]
    NoStateDir,
    #[error("another fleetd is already running (lock held): {0}")]
    LockFailed(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] fleet_core::StoreError),
    #[error(transparent)]
    Backend(#[from] fleet_core::BackendError),
    #[error(transparent)]
    Engine(#[from] fleet_core::EngineError),
}
