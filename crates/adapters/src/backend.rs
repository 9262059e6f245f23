// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backend contract (C3): the closed set of lifecycle operations a
//! backend must implement, plus its bootstrap hook.
//!
//! The source expresses this as a table of handler functions keyed by an
//! opaque task-event type, with a manual type assertion at the top of each
//! handler. Here it is an `async_trait` implemented once per backend, with
//! the dispatcher routing already-typed `Task` variants to the matching
//! method — so a payload-shape mismatch for a well-formed `Task` is a
//! compile-time impossibility (§4.3).

use async_trait::async_trait;
use fleet_core::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, BackendError, Config,
    InternalTask, ListApplicationsOption, TaskSender,
};

/// A backend realizes every application lifecycle operation for one
/// execution strategy (cluster or native). No backend-specific branch leaks
/// into the client facade (C6): callers only ever see this trait.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend's own background monitors (watch ingest, liveness
    /// probes). `post` lets those monitors re-enter the dispatcher as
    /// fire-and-forget internal tasks. Called exactly once, before bootstrap
    /// recovery (§4.6).
    async fn init(&self, post: TaskSender) -> Result<(), BackendError>;

    async fn create_application(&self, app: Application) -> Result<(), BackendError>;
    async fn remove_application(&self, tag: ApplicationTag) -> Result<(), BackendError>;
    async fn start_application(&self, tag: ApplicationTag) -> Result<(), BackendError>;
    async fn restart_application(&self, tag: ApplicationTag) -> Result<(), BackendError>;
    async fn stop_application(&self, tag: ApplicationTag) -> Result<(), BackendError>;
    async fn list_applications(
        &self,
        opt: ListApplicationsOption,
    ) -> Result<(Vec<ApplicationTag>, String), BackendError>;
    async fn get_application_states(
        &self,
        tags: Vec<ApplicationTag>,
    ) -> Result<Vec<ApplicationState>, BackendError>;
    async fn get_started_applications(&self) -> Result<Vec<ApplicationRuntime>, BackendError>;
    async fn create_config(&self, config: Config) -> Result<(), BackendError>;
    async fn remove_config(&self, name: String) -> Result<(), BackendError>;

    /// Handle one of the backend-internal re-entry tasks (§4.4, §4.5). A
    /// backend that does not recognize a given variant (e.g. a cluster
    /// variant reaching the native backend) returns `NotImplemented`.
    async fn handle_internal(&self, task: InternalTask) -> Result<(), BackendError>;
}
