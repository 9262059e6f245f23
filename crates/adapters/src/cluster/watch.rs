// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment watch ingest (§4.4's monitor): translates cluster watch
//! events into fire-and-forget dispatcher tasks.

use std::time::Duration;

use fleet_core::{ApplicationTag, InternalTask, Task, TaskSender};
use futures_util::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client};

use crate::cluster::env::{APP_LABEL, VERSION_LABEL};

fn tag_of(dep: &Deployment) -> Option<ApplicationTag> {
    let labels = dep.metadata.labels.as_ref()?;
    let name = labels.get(APP_LABEL)?.clone();
    let version = labels.get(VERSION_LABEL)?.clone();
    Some(ApplicationTag::new(name, version))
}

fn available(dep: &Deployment) -> bool {
    dep.status.as_ref().and_then(|s| s.available_replicas).unwrap_or(0) > 0
}

async fn post_internal(post: &TaskSender, task: InternalTask) {
    if post.send(Task::Internal(task)).await.is_err() {
        tracing::warn!("dispatcher closed; dropping watch-derived task");
    }
}

/// Runs forever, re-establishing the watch with backoff on stream failure.
/// The source notes this as a gap to close; `kube`'s own `watcher` already
/// retries internally, but this loop also restarts the stream if it ever
/// terminates, so the monitor never silently goes dark.
pub async fn run(client: Client, namespace: String, post: TaskSender) {
    let api: Api<Deployment> = Api::namespaced(client, &namespace);
    let mut backoff = Duration::from_millis(500);
    const MAX_BACKOFF: Duration = Duration::from_secs(30);

    loop {
        let mut stream = watcher::watcher(api.clone(), watcher::Config::default()).boxed();
        let mut saw_event = false;

        while let Some(event) = stream.next().await {
            match event {
                Ok(Event::Apply(dep)) | Ok(Event::InitApply(dep)) => {
                    saw_event = true;
                    handle_apply(&dep, &post).await;
                }
                Ok(Event::Delete(dep)) => {
                    saw_event = true;
                    handle_delete(&dep, &post).await;
                }
                Ok(Event::Init) | Ok(Event::InitDone) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "deployment watch error; reconnecting");
                }
            }
            if saw_event {
                backoff = Duration::from_millis(500);
            }
        }

        tracing::warn!(backoff_ms = backoff.as_millis() as u64, "deployment watch stream ended; retrying");
        tokio::time::sleep(backoff).await;
        backoff = std::cmp::min(backoff * 2, MAX_BACKOFF);
    }
}

async fn handle_apply(dep: &Deployment, post: &TaskSender) {
    let Some(tag) = tag_of(dep) else {
        tracing::debug!("ignoring deployment event with no identity labels");
        return;
    };
    if available(dep) {
        post_internal(post, InternalTask::MarkStarted(tag)).await;
    }
}

async fn handle_delete(dep: &Deployment, post: &TaskSender) {
    let Some(tag) = tag_of(dep) else { return };
    post_internal(post, InternalTask::MarkStopped(tag)).await;
}
