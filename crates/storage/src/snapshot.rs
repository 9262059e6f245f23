// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery.
//!
//! A snapshot stores the complete [`StoreState`] at a point in time,
//! identified by the WAL sequence number it was taken at. Recovery loads the
//! snapshot, then replays WAL entries with `seq > snapshot.seq`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::StoreState;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compression(std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: StoreState,
    pub created_at: DateTime<Utc>,
}

pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Writes and reads zstd-compressed JSON snapshots at a fixed path.
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let compressed = fs::read(&self.path)?;
        let bytes = zstd::decode_all(&compressed[..]).map_err(SnapshotError::Compression)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    /// Write a new snapshot synchronously, rotating the previous file to
    /// `.bak` first. Used on clean shutdown where blocking is acceptable.
    pub fn checkpoint_sync(
        &self,
        seq: u64,
        state: &StoreState,
    ) -> Result<CheckpointResult, SnapshotError> {
        let snapshot = Snapshot {
            version: CURRENT_SNAPSHOT_VERSION,
            seq,
            state: state.clone(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_vec(&snapshot)?;
        let compressed = zstd::encode_all(&json[..], 0).map_err(SnapshotError::Compression)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        if self.path.exists() {
            let bak = rotate_bak_path(&self.path);
            fs::rename(&self.path, bak)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut f = File::create(&tmp_path)?;
            f.write_all(&compressed)?;
            f.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(CheckpointResult { seq, size_bytes: compressed.len() as u64 })
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
