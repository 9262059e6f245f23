// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher's task type (C1).
//!
//! The source passes an opaque `interface{}` payload and a handler function
//! pointer on a shared channel, downcasting the payload inside each handler.
//! Here the payload is a typed enum instead: one variant per public
//! operation, so a task can never reach a handler with the wrong shape (the
//! `TaskEventInvalid` case in the source's handler table is unreachable for
//! any variant constructed by this crate's own facade). The one remaining
//! dynamic case — a task variant a given backend does not support — is
//! `BackendError::NotImplemented`, not a payload-shape error.

use tokio::sync::oneshot;

use crate::error::BackendError;
use crate::types::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, Config,
    ListApplicationsOption,
};

/// The result payload carried back on a task's reply channel. Every
/// dispatcher-visible operation produces one of these variants; callers
/// know statically which variant their own request implies and extract it
/// without runtime type inspection beyond this one match.
#[derive(Debug)]
pub enum TaskOutput {
    Unit,
    Tags(Vec<ApplicationTag>),
    States(Vec<ApplicationState>),
    Runtimes(Vec<ApplicationRuntime>),
}

pub type TaskReply = oneshot::Sender<Result<TaskOutput, BackendError>>;

/// Handle a backend's bootstrap hook (§4.6) uses to re-enter the dispatcher
/// from its own monitors (watch ingest, download completion, liveness
/// probes). Cloned freely; each clone is just another sender on the same
/// bounded queue.
pub type TaskSender = tokio::sync::mpsc::Sender<Task>;

/// A record enqueued on the dispatcher (C1): a typed input, implicitly a
/// handler (selected by the runtime's single `match` over the variant), and
/// an optional reply slot. `reply: None` marks a fire-and-forget task —
/// the pattern used by watch ingest and the liveness monitor to re-enter
/// the dispatcher from a detached background task.
#[derive(Debug)]
pub enum Task {
    CreateApplication { app: Application, reply: Option<TaskReply> },
    RemoveApplication { tag: ApplicationTag, reply: Option<TaskReply> },
    StartApplication { tag: ApplicationTag, reply: Option<TaskReply> },
    RestartApplication { tag: ApplicationTag, reply: Option<TaskReply> },
    StopApplication { tag: ApplicationTag, reply: Option<TaskReply> },
    ListApplications { opt: ListApplicationsOption, reply: Option<TaskReply> },
    GetApplicationStates { tags: Vec<ApplicationTag>, reply: Option<TaskReply> },
    GetStartedApplications { reply: Option<TaskReply> },
    CreateConfig { config: Config, reply: Option<TaskReply> },
    RemoveConfig { name: String, reply: Option<TaskReply> },

    /// Fire-and-forget: posted by a backend's own monitor/download/watch
    /// tasks re-entering the dispatcher. Never carries a reply slot.
    Internal(InternalTask),
}

/// Backend-internal re-entry tasks (§4.4 watch ingest, §4.5 download and
/// liveness monitor). These never originate from the client facade.
#[derive(Debug)]
pub enum InternalTask {
    /// Cluster watch observed `AvailableReplicas > 0` for this tag.
    MarkStarted(ApplicationTag),
    /// Cluster watch observed the Deployment deleted/erroring for this tag.
    MarkStopped(ApplicationTag),
    /// Native download completed; proceed to spawn.
    RunApplication(Application),
    /// Native download failed; `reason` is the download error's display text.
    DownloadApplicationFailed(Application, String),
    /// Native liveness monitor observed the child process gone.
    CleanStartedApplicationInfo(ApplicationTag),
}
