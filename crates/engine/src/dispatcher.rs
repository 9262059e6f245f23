// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-consumer task dispatcher (C1): one worker, one backend, a
//! bounded queue. Because the worker is strictly sequential, no two
//! handlers ever run concurrently — the only synchronization the rest of
//! the crate relies on.

use std::sync::Arc;

use fleet_adapters::Backend;
use fleet_core::{Task, TaskOutput, TaskReply};
use tokio::sync::mpsc;

/// Resolves `FLEETD_QUEUE_CAPACITY`, defaulting to 1024.
pub fn queue_capacity() -> usize {
    std::env::var("FLEETD_QUEUE_CAPACITY").ok().and_then(|v| v.parse().ok()).unwrap_or(1024)
}

/// Spawns the dispatcher's worker loop and returns a sender for posting
/// tasks. Dropping every clone of the sender lets the worker exit its loop
/// and return, which is how the dispatcher's implicit shutdown works: no
/// caller or backend task holds the sender past shutdown.
pub fn spawn(backend: Arc<dyn Backend>, capacity: usize) -> mpsc::Sender<Task> {
    let (tx, rx) = mpsc::channel(capacity);
    tokio::spawn(worker_loop(backend, rx));
    tx
}

async fn worker_loop(backend: Arc<dyn Backend>, mut rx: mpsc::Receiver<Task>) {
    while let Some(task) = rx.recv().await {
        handle_one(&backend, task).await;
    }
    tracing::debug!("dispatcher worker exiting: all senders dropped");
}

fn reply(slot: Option<TaskReply>, result: Result<TaskOutput, fleet_core::BackendError>) {
    if let Some(slot) = slot {
        // A buffered (capacity one) reply: a late send after the caller
        // already timed out is simply discarded, never blocks the worker.
        let _ = slot.send(result);
    }
}

async fn handle_one(backend: &Arc<dyn Backend>, task: Task) {
    match task {
        Task::CreateApplication { app, reply: slot } => {
            let tag = app.tag.clone();
            tracing::debug!(name = %tag.name, version = %tag.version, "create application......");
            let result = backend.create_application(app).await;
            log_outcome("create_application", &tag, &result);
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::RemoveApplication { tag, reply: slot } => {
            tracing::debug!(name = %tag.name, version = %tag.version, "remove application......");
            let result = backend.remove_application(tag.clone()).await;
            log_outcome("remove_application", &tag, &result);
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::StartApplication { tag, reply: slot } => {
            tracing::debug!(name = %tag.name, version = %tag.version, "start application......");
            let result = backend.start_application(tag.clone()).await;
            log_outcome("start_application", &tag, &result);
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::RestartApplication { tag, reply: slot } => {
            tracing::debug!(name = %tag.name, version = %tag.version, "restart application......");
            let result = backend.restart_application(tag.clone()).await;
            log_outcome("restart_application", &tag, &result);
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::StopApplication { tag, reply: slot } => {
            tracing::debug!(name = %tag.name, version = %tag.version, "stop application......");
            let result = backend.stop_application(tag.clone()).await;
            log_outcome("stop_application", &tag, &result);
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::ListApplications { opt, reply: slot } => {
            // `TaskOutput::Tags` carries only the tag list; the resumable
            // cursor is reconstructed by the facade as the last tag's own
            // key, per the store's "cursor equals the last key emitted"
            // contract, so the backend's cursor string need not round-trip
            // through the reply channel.
            let result = backend.list_applications(opt).await;
            reply(slot, result.map(|(tags, _cursor)| TaskOutput::Tags(tags)));
        }
        Task::GetApplicationStates { tags, reply: slot } => {
            let result = backend.get_application_states(tags).await;
            reply(slot, result.map(TaskOutput::States));
        }
        Task::GetStartedApplications { reply: slot } => {
            let result = backend.get_started_applications().await;
            reply(slot, result.map(TaskOutput::Runtimes));
        }
        Task::CreateConfig { config, reply: slot } => {
            let result = backend.create_config(config).await;
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::RemoveConfig { name, reply: slot } => {
            let result = backend.remove_config(name).await;
            reply(slot, result.map(|()| TaskOutput::Unit));
        }
        Task::Internal(internal) => {
            if let Err(e) = backend.handle_internal(internal).await {
                tracing::warn!(error = %e, "internal task handling failed");
            }
        }
    }
}

fn log_outcome(op: &str, tag: &fleet_core::ApplicationTag, result: &Result<(), fleet_core::BackendError>) {
    match result {
        Ok(()) => tracing::info!(op, name = %tag.name, version = %tag.version, "lifecycle transition complete"),
        Err(e) => tracing::warn!(op, name = %tag.name, version = %tag.version, error = %e, "lifecycle transition failed"),
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
