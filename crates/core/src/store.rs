// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed facade trait over an ordered key-value store (C2).
//!
//! Implementations live in `fleet-storage`; this crate only defines the
//! contract so both the storage crate and the backend crates can depend on
//! it without a cycle.

use crate::error::StoreError;
use crate::types::{Application, ApplicationRuntime, ApplicationTag, Config};

/// Typed facade over the external KV store for `Application`,
/// `ApplicationRuntime`, and `Config` records.
///
/// All operations are synchronous (store I/O is assumed cheap relative to
/// backend RPC — see the concurrency model) and run from inside the
/// dispatcher's single worker, so implementations need not be internally
/// lock-free, only internally consistent under a single caller at a time.
pub trait Store: Send + Sync {
    fn add_application(&self, app: &Application) -> Result<(), StoreError>;
    fn remove_application(&self, tag: &ApplicationTag) -> Result<(), StoreError>;
    fn update_application(
        &self,
        tag: &ApplicationTag,
        mutator: &mut dyn FnMut(&mut Application),
    ) -> Result<(), StoreError>;
    fn has_application(&self, tag: &ApplicationTag) -> Result<bool, StoreError>;
    fn get_application(&self, tag: &ApplicationTag) -> Result<Application, StoreError>;
    /// Prefix scan starting strictly after `cursor` (exclusive — see
    /// Open Question 4 resolution), returning at most `size` tags and a
    /// resumable cursor equal to the last key emitted.
    fn list_applications(
        &self,
        size: usize,
        cursor: &str,
    ) -> Result<(Vec<ApplicationTag>, String), StoreError>;

    fn add_application_runtime(&self, rt: &ApplicationRuntime) -> Result<(), StoreError>;
    /// Durable delete: the store engine fsyncs this write before returning.
    fn remove_application_runtime(&self, name: &str) -> Result<(), StoreError>;
    fn update_application_runtime(
        &self,
        name: &str,
        mutator: &mut dyn FnMut(&mut ApplicationRuntime) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;
    fn get_application_runtime(&self, name: &str) -> Result<ApplicationRuntime, StoreError>;
    fn foreach_application_runtime(&self, visitor: &mut dyn FnMut(&ApplicationRuntime));

    fn add_config(&self, config: &Config) -> Result<(), StoreError>;
    fn remove_config(&self, name: &str) -> Result<(), StoreError>;
    fn has_config(&self, name: &str) -> Result<bool, StoreError>;
    fn get_config(&self, name: &str) -> Result<Config, StoreError>;
}
