// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client facade (C6): a synchronous-looking caller API over the
//! dispatcher. Each method posts one task and waits on its reply slot with
//! a deadline; `RemoveApplication` additionally issues a preceding
//! `StopApplication`, tolerating `ApplicationNotStarted`.

use std::time::Duration;

use fleet_core::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, Config, EngineError,
    ListApplicationsOption, Task, TaskOutput,
};
use tokio::sync::{mpsc, oneshot};

/// Resolves `FLEETD_TASK_TIMEOUT_MS`, defaulting to 100 seconds.
fn task_timeout() -> Duration {
    let ms: u64 = std::env::var("FLEETD_TASK_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100_000);
    Duration::from_millis(ms)
}

/// Caller-facing handle to a running dispatcher (C1). Cheap to clone.
#[derive(Clone)]
pub struct Client {
    tx: mpsc::Sender<Task>,
}

impl Client {
    pub fn new(tx: mpsc::Sender<Task>) -> Self {
        Self { tx }
    }

    async fn call(&self, make: impl FnOnce(Option<fleet_core::TaskReply>) -> Task) -> Result<TaskOutput, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let task = make(Some(reply_tx));
        self.tx.send(task).await.map_err(|_| EngineError::ClientNotStarted)?;

        match tokio::time::timeout(task_timeout(), reply_rx).await {
            Ok(Ok(result)) => result.map_err(EngineError::from),
            Ok(Err(_)) => Err(EngineError::ClientNotStarted),
            Err(_) => Err(EngineError::Timeout),
        }
    }

    fn validate_tag(tag: &ApplicationTag) -> Result<(), EngineError> {
        if tag.name.is_empty() || tag.version.is_empty() {
            return Err(EngineError::ParamInvalid);
        }
        Ok(())
    }

    pub async fn create_application(&self, app: Application) -> Result<(), EngineError> {
        Self::validate_tag(&app.tag)?;
        self.call(|reply| Task::CreateApplication { app, reply }).await?;
        Ok(())
    }

    pub async fn remove_application(&self, tag: ApplicationTag) -> Result<(), EngineError> {
        Self::validate_tag(&tag)?;
        match self.stop_application(tag.clone()).await {
            Ok(()) => {}
            Err(e) if e.is_application_not_started() => {}
            Err(e) => return Err(e),
        }
        self.call(|reply| Task::RemoveApplication { tag, reply }).await?;
        Ok(())
    }

    pub async fn start_application(&self, tag: ApplicationTag) -> Result<(), EngineError> {
        Self::validate_tag(&tag)?;
        self.call(|reply| Task::StartApplication { tag, reply }).await?;
        Ok(())
    }

    pub async fn restart_application(&self, tag: ApplicationTag) -> Result<(), EngineError> {
        Self::validate_tag(&tag)?;
        self.call(|reply| Task::RestartApplication { tag, reply }).await?;
        Ok(())
    }

    pub async fn stop_application(&self, tag: ApplicationTag) -> Result<(), EngineError> {
        Self::validate_tag(&tag)?;
        self.call(|reply| Task::StopApplication { tag, reply }).await?;
        Ok(())
    }

    /// Pagination cursor is reconstructed here, not threaded through the
    /// reply channel: the store's contract makes it exactly the tag of the
    /// last emitted record.
    pub async fn list_applications(
        &self,
        opt: ListApplicationsOption,
    ) -> Result<(Vec<ApplicationTag>, String), EngineError> {
        let prior_cursor = opt.cursor.clone();
        let output = self.call(|reply| Task::ListApplications { opt, reply }).await?;
        let TaskOutput::Tags(tags) = output else { return Err(EngineError::TaskResultInvalid) };
        let next_cursor = tags.last().map(|t| t.tag()).unwrap_or(prior_cursor);
        Ok((tags, next_cursor))
    }

    pub async fn get_application_states(
        &self,
        tags: Vec<ApplicationTag>,
    ) -> Result<Vec<ApplicationState>, EngineError> {
        let output = self.call(|reply| Task::GetApplicationStates { tags, reply }).await?;
        let TaskOutput::States(states) = output else { return Err(EngineError::TaskResultInvalid) };
        Ok(states)
    }

    pub async fn get_started_applications(&self) -> Result<Vec<ApplicationRuntime>, EngineError> {
        let output = self.call(|reply| Task::GetStartedApplications { reply }).await?;
        let TaskOutput::Runtimes(runtimes) = output else { return Err(EngineError::TaskResultInvalid) };
        Ok(runtimes)
    }

    pub async fn create_config(&self, config: Config) -> Result<(), EngineError> {
        if config.name.is_empty() {
            return Err(EngineError::ParamInvalid);
        }
        self.call(|reply| Task::CreateConfig { config, reply }).await?;
        Ok(())
    }

    pub async fn remove_config(&self, name: String) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError::ParamInvalid);
        }
        self.call(|reply| Task::RemoveConfig { name, reply }).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
