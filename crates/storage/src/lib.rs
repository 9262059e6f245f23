// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleet-storage: the concrete `Store` implementation (C2 + C7) — an
//! in-memory index rebuilt from a write-ahead log plus periodic snapshot, so
//! the desired-state store survives process restarts without an external
//! database dependency.

mod engine;
mod snapshot;
mod state;
mod wal;

pub use engine::StoreEngine;
pub use snapshot::{Checkpointer, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{StoreState, WalOp};
pub use wal::{Wal, WalEntry, WalError};
