// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log: one JSON line per [`WalOp`], prefixed with a monotonic
//! sequence number. Replaying the tail after a snapshot rebuilds
//! [`StoreState`](crate::state::StoreState) exactly.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::WalOp;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt WAL entry at offset {0}")]
    Corrupt(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub op: WalOp,
}

/// Append-only log over a single file, opened in append mode for the life of
/// the process. `append` always writes a complete line; `flush` fsyncs.
pub struct Wal {
    file: File,
    path: PathBuf,
    next_seq: u64,
}

impl Wal {
    /// Open (creating if absent) the WAL file at `path`, with the next
    /// sequence number to assign set to `starting_seq`.
    pub fn open(path: impl Into<PathBuf>, starting_seq: u64) -> Result<Self, WalError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { file, path, next_seq: starting_seq })
    }

    /// Replay every entry in `path` whose `seq` is strictly greater than
    /// `after_seq`, in file order, via `visit`. Returns the highest sequence
    /// number observed (or `after_seq` if the file is empty/absent).
    pub fn replay(
        path: impl AsRef<Path>,
        after_seq: u64,
        mut visit: impl FnMut(&WalOp),
    ) -> Result<u64, WalError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(after_seq);
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut max_seq = after_seq;
        for (offset, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let entry: WalEntry =
                serde_json::from_str(&line).map_err(|_| WalError::Corrupt(offset))?;
            if entry.seq > after_seq {
                visit(&entry.op);
                max_seq = max_seq.max(entry.seq);
            }
        }
        Ok(max_seq)
    }

    /// Append `op` as a new entry, assigning it the next sequence number.
    /// Returns the assigned sequence. Does not fsync — call [`Wal::flush`]
    /// for durable writes (runtime deletes require this; see §4.2).
    pub fn append(&mut self, op: &WalOp) -> Result<u64, WalError> {
        let seq = self.next_seq;
        let entry = WalEntry { seq, op: op.clone() };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.next_seq += 1;
        Ok(seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Truncate the log to empty and reset the sequence counter, used after
    /// a checkpoint has durably captured everything up to `checkpoint_seq`.
    pub fn reset_after_checkpoint(&mut self, checkpoint_seq: u64) -> Result<(), WalError> {
        self.file = OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.next_seq = checkpoint_seq + 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
