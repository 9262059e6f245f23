// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `Backend` for exercising the dispatcher and facade without
//! a real cluster or native process, gated behind `test-support`.

use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, BackendError, Config,
    InternalTask, ListApplicationsOption, Store, StoreError, TaskSender,
};
use parking_lot::Mutex;

use crate::backend::Backend;

/// A `Backend` whose "process" is just a bool in the runtime record: no
/// subprocess, no cluster call, no watch. `StartApplication` marks the
/// runtime started synchronously, so callers don't need to race a monitor.
pub struct FakeBackend {
    store: Arc<dyn Store>,
    post: Mutex<Option<TaskSender>>,
}

impl FakeBackend {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store, post: Mutex::new(None) }
    }

    pub fn post_sender(&self) -> Option<TaskSender> {
        self.post.lock().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn init(&self, post: TaskSender) -> Result<(), BackendError> {
        *self.post.lock() = Some(post);
        Ok(())
    }

    async fn create_application(&self, app: Application) -> Result<(), BackendError> {
        self.store.add_application(&app).map_err(|e| match e {
            StoreError::AppExisted => BackendError::ApplicationExisted,
            other => other.into(),
        })
    }

    async fn remove_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        if let Ok(rt) = self.store.get_application_runtime(&tag.name) {
            if rt.tag.version == tag.version {
                match self.stop_application(tag.clone()).await {
                    Ok(()) | Err(BackendError::ApplicationNotStarted) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        self.store.remove_application(&tag).map_err(|e| match e {
            StoreError::AppNoFound => BackendError::ApplicationNoExisted,
            other => other.into(),
        })
    }

    async fn start_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        if let Ok(rt) = self.store.get_application_runtime(&tag.name) {
            if rt.is_started {
                return Err(BackendError::ApplicationStarted);
            }
        }
        self.store.get_application(&tag).map_err(|e| match e {
            StoreError::AppNoFound => BackendError::ApplicationNoExisted,
            other => other.into(),
        })?;

        let mut rt = ApplicationRuntime::new(tag.clone());
        rt.to_start = true;
        rt.is_started = true;
        rt.pid = 4242;
        match self.store.update_application_runtime(&tag.name, &mut |existing| {
            *existing = rt.clone();
            Ok(())
        }) {
            Ok(()) => {}
            Err(StoreError::AppRuntimeNoFound) => self.store.add_application_runtime(&rt)?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    async fn restart_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        if let Ok(rt) = self.store.get_application_runtime(&tag.name) {
            if rt.tag.version == tag.version && rt.is_started {
                return Ok(());
            }
        }
        self.start_application(tag).await
    }

    async fn stop_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        let rt = self
            .store
            .get_application_runtime(&tag.name)
            .map_err(|_| BackendError::ApplicationNotStarted)?;
        if rt.tag.version != tag.version || !rt.is_started {
            return Err(BackendError::ApplicationNotStarted);
        }
        self.store.remove_application_runtime(&tag.name)?;
        Ok(())
    }

    async fn list_applications(
        &self,
        opt: ListApplicationsOption,
    ) -> Result<(Vec<ApplicationTag>, String), BackendError> {
        Ok(self.store.list_applications(opt.size, &opt.cursor)?)
    }

    async fn get_application_states(
        &self,
        tags: Vec<ApplicationTag>,
    ) -> Result<Vec<ApplicationState>, BackendError> {
        Ok(tags
            .into_iter()
            .map(|tag| {
                let rt = match self.store.get_application_runtime(&tag.name) {
                    Ok(rt) if rt.tag.version == tag.version => rt,
                    _ => ApplicationRuntime::new(tag.clone()),
                };
                ApplicationState {
                    name: tag.name,
                    version: tag.version,
                    to_start: rt.to_start,
                    is_started: rt.is_started,
                    err: rt.err,
                    instances: Vec::new(),
                }
            })
            .collect())
    }

    async fn get_started_applications(&self) -> Result<Vec<ApplicationRuntime>, BackendError> {
        let mut out = Vec::new();
        self.store.foreach_application_runtime(&mut |rt| {
            if rt.to_start {
                out.push(rt.clone());
            }
        });
        Ok(out)
    }

    async fn create_config(&self, config: Config) -> Result<(), BackendError> {
        self.store.add_config(&config)?;
        Ok(())
    }

    async fn remove_config(&self, name: String) -> Result<(), BackendError> {
        self.store.remove_config(&name)?;
        Ok(())
    }

    async fn handle_internal(&self, _task: InternalTask) -> Result<(), BackendError> {
        Err(BackendError::NotImplemented)
    }
}
