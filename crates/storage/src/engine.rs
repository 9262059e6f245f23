// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The concrete store engine (C7): an in-memory index fronting a
//! write-ahead log and periodic snapshot, implementing `fleet_core::Store`.

use std::path::{Path, PathBuf};

use fleet_core::{Application, ApplicationRuntime, ApplicationTag, Config, Store, StoreError};
use parking_lot::Mutex;

use crate::snapshot::Checkpointer;
use crate::state::{StoreState, WalOp};
use crate::wal::Wal;

fn engine_err<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Engine(e.to_string())
}

struct Inner {
    state: StoreState,
    wal: Wal,
}

/// Opens a directory laid out as `{dir}/wal/events.wal` plus
/// `{dir}/snapshot.json`, replaying on open and exposing the `Store`
/// contract. One `StoreEngine` is meant to be wrapped in an `Arc` and shared
/// by the dispatcher's single worker (§4.1) — its own locking exists only to
/// satisfy `Store: Send + Sync`, not to admit concurrent writers.
pub struct StoreEngine {
    inner: Mutex<Inner>,
    snapshot_path: PathBuf,
}

impl StoreEngine {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let wal_path = dir.join("wal").join("events.wal");
        let snapshot_path = dir.join("snapshot.json");

        let checkpointer = Checkpointer::new(&snapshot_path);
        let snapshot = checkpointer.load().map_err(engine_err)?;

        let mut state = snapshot.as_ref().map(|s| s.state.clone()).unwrap_or_default();
        let base_seq = snapshot.as_ref().map(|s| s.seq).unwrap_or(0);

        let max_seq =
            Wal::replay(&wal_path, base_seq, |op| state.apply(op)).map_err(engine_err)?;

        let wal = Wal::open(&wal_path, max_seq + 1).map_err(engine_err)?;

        Ok(Self { inner: Mutex::new(Inner { state, wal }), snapshot_path })
    }

    /// Force a synchronous snapshot of the current state and truncate the
    /// WAL, so the next open replays nothing. Safe to call at any time;
    /// typically invoked at shutdown (mirroring this codebase's existing
    /// shutdown checkpoint) or on a periodic timer.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let seq = inner.wal.next_seq().saturating_sub(1);
        let checkpointer = Checkpointer::new(&self.snapshot_path);
        checkpointer.checkpoint_sync(seq, &inner.state).map_err(engine_err)?;
        inner.wal.reset_after_checkpoint(seq).map_err(engine_err)?;
        Ok(())
    }

    fn append(&self, inner: &mut Inner, op: WalOp) -> Result<(), StoreError> {
        inner.wal.append(&op).map_err(engine_err)?;
        inner.state.apply(&op);
        Ok(())
    }

    /// Append `op` and force an fsync before returning (runtime deletes, §4.2).
    fn append_durable(&self, inner: &mut Inner, op: WalOp) -> Result<(), StoreError> {
        inner.wal.append(&op).map_err(engine_err)?;
        inner.wal.flush().map_err(engine_err)?;
        inner.state.apply(&op);
        Ok(())
    }
}

impl Store for StoreEngine {
    fn add_application(&self, app: &Application) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.applications.contains_key(&app.tag.tag()) {
            return Err(StoreError::AppExisted);
        }
        self.append(&mut inner, WalOp::PutApplication(app.clone()))
    }

    fn remove_application(&self, tag: &ApplicationTag) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.state.applications.contains_key(&tag.tag()) {
            return Err(StoreError::AppNoFound);
        }
        self.append(&mut inner, WalOp::DeleteApplication(tag.tag()))
    }

    fn update_application(
        &self,
        tag: &ApplicationTag,
        mutator: &mut dyn FnMut(&mut Application),
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let mut app = inner
            .state
            .applications
            .get(&tag.tag())
            .cloned()
            .ok_or(StoreError::AppNoFound)?;
        mutator(&mut app);
        self.append(&mut inner, WalOp::PutApplication(app))
    }

    fn has_application(&self, tag: &ApplicationTag) -> Result<bool, StoreError> {
        Ok(self.inner.lock().state.applications.contains_key(&tag.tag()))
    }

    fn get_application(&self, tag: &ApplicationTag) -> Result<Application, StoreError> {
        self.inner.lock().state.applications.get(&tag.tag()).cloned().ok_or(StoreError::AppNoFound)
    }

    fn list_applications(
        &self,
        size: usize,
        cursor: &str,
    ) -> Result<(Vec<ApplicationTag>, String), StoreError> {
        let inner = self.inner.lock();
        let tags: Vec<ApplicationTag> = inner
            .state
            .applications
            .range(next_key_after(cursor)..)
            .take(size)
            .map(|(_, app)| app.tag.clone())
            .collect();

        let next_cursor = tags.last().map(|t| t.tag()).unwrap_or_else(|| cursor.to_string());
        Ok((tags, next_cursor))
    }

    fn add_application_runtime(&self, rt: &ApplicationRuntime) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.runtimes.contains_key(&rt.tag.name) {
            return Err(StoreError::AppRuntimeExisted);
        }
        self.append(&mut inner, WalOp::PutRuntime(rt.clone()))
    }

    fn remove_application_runtime(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.state.runtimes.contains_key(name) {
            return Err(StoreError::AppRuntimeNoFound);
        }
        self.append_durable(&mut inner, WalOp::DeleteRuntime(name.to_string()))
    }

    fn update_application_runtime(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut ApplicationRuntime) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let mut rt =
            inner.state.runtimes.get(name).cloned().ok_or(StoreError::AppRuntimeNoFound)?;
        mutator(&mut rt)?;
        self.append(&mut inner, WalOp::PutRuntime(rt))
    }

    fn get_application_runtime(&self, name: &str) -> Result<ApplicationRuntime, StoreError> {
        self.inner.lock().state.runtimes.get(name).cloned().ok_or(StoreError::AppRuntimeNoFound)
    }

    fn foreach_application_runtime(&self, visitor: &mut dyn FnMut(&ApplicationRuntime)) {
        let inner = self.inner.lock();
        for rt in inner.state.runtimes.values() {
            visitor(rt);
        }
    }

    fn add_config(&self, config: &Config) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        self.append(&mut inner, WalOp::PutConfig(config.clone()))
    }

    fn remove_config(&self, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        self.append(&mut inner, WalOp::DeleteConfig(name.to_string()))
    }

    fn has_config(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().state.configs.contains_key(name))
    }

    fn get_config(&self, name: &str) -> Result<Config, StoreError> {
        self.inner.lock().state.configs.get(name).cloned().ok_or(StoreError::ConfigNoFound)
    }
}

/// The first key strictly greater than `cursor` in lexicographic order,
/// implementing the exclusive-cursor resolution (§4.2, Open Question 4):
/// append a NUL byte, which sorts after any string `cursor` is a prefix of
/// and after `cursor` itself under byte-wise comparison.
fn next_key_after(cursor: &str) -> String {
    if cursor.is_empty() {
        return String::new();
    }
    format!("{cursor}\0")
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
