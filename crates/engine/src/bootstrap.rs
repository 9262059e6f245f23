// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bootstrap recovery (§4.6): after the backend's own monitors are
//! launched, every runtime with `toStart=true` is reconciled by a blocking
//! `RestartApplication`, reclaiming applications across process restarts.

use std::sync::Arc;

use fleet_adapters::Backend;
use fleet_core::TaskSender;

use crate::client::Client;
use crate::dispatcher;

/// Starts the dispatcher, runs the backend's `init` hook, and performs
/// bootstrap recovery. Returns a ready-to-use [`Client`].
pub async fn start(backend: Arc<dyn Backend>) -> Result<Client, fleet_core::EngineError> {
    let tx: TaskSender = dispatcher::spawn(backend.clone(), dispatcher::queue_capacity());
    let client = Client::new(tx.clone());

    backend.init(tx).await?;

    let runtimes = client.get_started_applications().await?;
    for rt in runtimes {
        tracing::info!(name = %rt.tag.name, version = %rt.tag.version, "reclaiming application on bootstrap");
        if let Err(e) = client.restart_application(rt.tag.clone()).await {
            tracing::warn!(
                name = %rt.tag.name,
                version = %rt.tag.version,
                error = %e,
                "bootstrap restart failed; application remains marked to-start for the next attempt"
            );
        }
    }

    Ok(client)
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
