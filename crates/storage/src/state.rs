// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state rebuilt from WAL replay: the in-memory index backing
//! the `Store` trait (§4.2.1).

use std::collections::{BTreeMap, HashMap};

use fleet_core::{Application, ApplicationRuntime, Config};
use serde::{Deserialize, Serialize};

/// The three key prefixes from §4.2, each materialized as its own map.
/// Applications are `BTreeMap`-ordered on their tag string so prefix scans
/// (`ListApplications`) are a plain range iteration; runtimes and configs are
/// keyed by name alone and never iterated in order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreState {
    pub applications: BTreeMap<String, Application>,
    pub runtimes: HashMap<String, ApplicationRuntime>,
    pub configs: HashMap<String, Config>,
}

/// One WAL-recorded mutation. Applying the full WAL tail (after a snapshot)
/// in order reconstructs [`StoreState`] exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalOp {
    PutApplication(Application),
    DeleteApplication(String),
    PutRuntime(ApplicationRuntime),
    DeleteRuntime(String),
    PutConfig(Config),
    DeleteConfig(String),
}

impl StoreState {
    pub fn apply(&mut self, op: &WalOp) {
        match op {
            WalOp::PutApplication(app) => {
                self.applications.insert(app.tag.tag(), app.clone());
            }
            WalOp::DeleteApplication(key) => {
                self.applications.remove(key);
            }
            WalOp::PutRuntime(rt) => {
                self.runtimes.insert(rt.tag.name.clone(), rt.clone());
            }
            WalOp::DeleteRuntime(name) => {
                self.runtimes.remove(name);
            }
            WalOp::PutConfig(config) => {
                self.configs.insert(config.name.clone(), config.clone());
            }
            WalOp::DeleteConfig(name) => {
                self.configs.remove(name);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
