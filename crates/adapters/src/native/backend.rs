// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The native backend (C5): supervises one child process per application,
//! downloads resources ahead of launch, and detects process exit.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, BackendError, Config,
    InstanceState, InternalTask, ListApplicationsOption, Store, StoreError, Task, TaskSender,
};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::native::instance::Instance;
use crate::native::{config, download, env};

/// One name's in-memory supervision state. `Downloading` holds only a
/// cancellation token — the process itself does not exist yet.
enum Slot {
    Downloading { version: String, cancel: CancellationToken },
    Running(Arc<Instance>),
}

pub struct NativeBackend {
    store: Arc<dyn Store>,
    base_dir: PathBuf,
    instances: Mutex<HashMap<String, Slot>>,
    post: Mutex<Option<TaskSender>>,
}

impl NativeBackend {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_base_dir(store, env::base_dir())
    }

    pub fn with_base_dir(store: Arc<dyn Store>, base_dir: PathBuf) -> Self {
        Self { store, base_dir, instances: Mutex::new(HashMap::new()), post: Mutex::new(None) }
    }

    fn instance_dir(&self, tag: &ApplicationTag) -> PathBuf {
        self.base_dir.join(&tag.name).join(&tag.version)
    }

    fn post_sender(&self) -> Option<TaskSender> {
        self.post.lock().clone()
    }

    fn upsert_runtime(&self, rt: ApplicationRuntime) -> Result<(), StoreError> {
        let name = rt.tag.name.clone();
        match self.store.update_application_runtime(&name, &mut |existing| {
            *existing = rt.clone();
            Ok(())
        }) {
            Ok(()) => Ok(()),
            Err(StoreError::AppRuntimeNoFound) => self.store.add_application_runtime(&rt),
            Err(e) => Err(e),
        }
    }

    fn spawn_liveness_monitor(&self, instance: Arc<Instance>, post: TaskSender) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(env::liveness_poll_interval());
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = instance.cancel.cancelled() => return,
                    _ = interval.tick() => {
                        if !instance.is_alive() {
                            let tag = instance.tag.clone();
                            if post.send(Task::Internal(InternalTask::CleanStartedApplicationInfo(tag))).await.is_err() {
                                tracing::warn!("dispatcher closed; liveness monitor exiting");
                            }
                            return;
                        }
                    }
                }
            }
        });
    }

    /// Spawns the detached download task (§4.5 step 5). Fire-and-forget:
    /// its only effect is re-entering the dispatcher with the outcome.
    fn spawn_download(&self, app: Application, dir: PathBuf, cancel: CancellationToken, post: TaskSender) {
        tokio::spawn(async move {
            let Some(spec) = app.native_spec.as_ref() else {
                tracing::warn!(tag = %app.tag, "native application has no native spec");
                return;
            };
            if let Some(resource) = spec.resource.as_ref() {
                if std::fs::create_dir_all(&dir).is_err() {
                    tracing::warn!(tag = %app.tag, "failed to create instance directory for download");
                }
                match download::download(resource, &dir, &cancel).await {
                    Ok(_) => {
                        let _ = post.send(Task::Internal(InternalTask::RunApplication(app))).await;
                    }
                    Err(e) => {
                        tracing::warn!(tag = %app.tag, error = %e, "native resource download failed");
                        let reason = e.to_string();
                        let _ = post
                            .send(Task::Internal(InternalTask::DownloadApplicationFailed(app, reason)))
                            .await;
                    }
                }
            } else {
                let _ = post.send(Task::Internal(InternalTask::RunApplication(app))).await;
            }
        });
    }
}

#[async_trait]
impl Backend for NativeBackend {
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
        if self.instances.lock().contains_key(&tag.name) {
            return Err(BackendError::ApplicationStarted);
        }

        let app = self.store.get_application(&tag).map_err(|e| match e {
            StoreError::AppNoFound => BackendError::ApplicationNoExisted,
            other => other.into(),
        })?;

        let mut rt = ApplicationRuntime::new(tag.clone());
        rt.to_start = true;
        self.upsert_runtime(rt)?;

        let dir = self.instance_dir(&tag);
        let cancel = CancellationToken::new();
        self.instances
            .lock()
            .insert(tag.name.clone(), Slot::Downloading { version: tag.version.clone(), cancel: cancel.clone() });

        let post = self.post_sender().ok_or(BackendError::NotImplemented)?;
        self.spawn_download(app, dir, cancel, post);
        Ok(())
    }

    async fn restart_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        if let Some(Slot::Running(instance)) = self.instances.lock().get(&tag.name) {
            if instance.tag.version == tag.version && instance.is_alive() {
                return Ok(());
            }
        }

        let rt = self.store.get_application_runtime(&tag.name).ok();
        if let Some(rt) = rt.filter(|rt| rt.tag.version == tag.version && rt.pid > 0) {
            let dir = self.instance_dir(&tag);
            if let Ok(instance) = Instance::bind(tag.clone(), dir, rt.pid) {
                let instance = Arc::new(instance);
                self.instances.lock().insert(tag.name.clone(), Slot::Running(instance.clone()));
                if let Err(e) = self.store.update_application_runtime(&tag.name, &mut |rt| {
                    rt.is_started = true;
                    rt.err.clear();
                    Ok(())
                }) {
                    tracing::warn!(name = %tag.name, error = %e, "failed to mark runtime started after bind");
                }
                if let Some(post) = self.post_sender() {
                    self.spawn_liveness_monitor(instance, post);
                }
                return Ok(());
            }
        }

        self.start_application(tag).await
    }

    async fn stop_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        let slot = self.instances.lock().remove(&tag.name);
        let matches = match &slot {
            Some(Slot::Running(instance)) => instance.tag.version == tag.version,
            Some(Slot::Downloading { version, .. }) => *version == tag.version,
            None => false,
        };
        if !matches {
            if let Some(slot) = slot {
                self.instances.lock().insert(tag.name.clone(), slot);
            }
            return Err(BackendError::ApplicationNotStarted);
        }

        match slot {
            Some(Slot::Running(instance)) => instance.stop().await,
            Some(Slot::Downloading { cancel, .. }) => cancel.cancel(),
            None => unreachable!("checked above"),
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
        let mut out = Vec::with_capacity(tags.len());
        for tag in tags {
            let rt = match self.store.get_application_runtime(&tag.name) {
                Ok(rt) if rt.tag.version == tag.version => rt,
                _ => ApplicationRuntime::new(tag.clone()),
            };
            let instances = match self.instances.lock().get(&tag.name) {
                Some(Slot::Running(instance)) if instance.tag.version == tag.version => {
                    vec![InstanceState {
                        name: tag.name.clone(),
                        running: instance.is_alive(),
                        cpu: 0,
                        mem: 0,
                    }]
                }
                _ => Vec::new(),
            };
            out.push(ApplicationState {
                name: tag.name,
                version: tag.version,
                to_start: rt.to_start,
                is_started: rt.is_started,
                err: rt.err,
                instances,
            });
        }
        Ok(out)
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
        config::materialize(&self.base_dir, &config.name, &config.data)?;
        Ok(())
    }

    async fn remove_config(&self, name: String) -> Result<(), BackendError> {
        if !self.store.has_config(&name)? {
            return Err(BackendError::ConfigNoExisted);
        }
        self.store.remove_config(&name)?;
        config::remove(&self.base_dir, &name)?;
        Ok(())
    }

    async fn handle_internal(&self, task: InternalTask) -> Result<(), BackendError> {
        match task {
            InternalTask::RunApplication(app) => self.handle_run_application(app).await,
            InternalTask::DownloadApplicationFailed(app, reason) => {
                self.handle_download_failed(app, reason).await
            }
            InternalTask::CleanStartedApplicationInfo(tag) => self.handle_clean_started(tag),
            _ => Err(BackendError::NotImplemented),
        }
    }
}

impl NativeBackend {
    async fn handle_run_application(&self, app: Application) -> Result<(), BackendError> {
        let name = app.tag.name.clone();
        let matches = matches!(
            self.instances.lock().get(&name),
            Some(Slot::Downloading { version, .. }) if *version == app.tag.version
        );
        if !matches {
            tracing::debug!(tag = %app.tag, "run-application for a superseded or removed instance; ignoring");
            return Ok(());
        }

        let dir = self.instance_dir(&app.tag);
        match Instance::start(app.tag.clone(), dir, &app).await {
            Ok(instance) => {
                let instance = Arc::new(instance);
                self.instances.lock().insert(name.clone(), Slot::Running(instance.clone()));
                let pid = instance.pid();
                if let Err(e) = self.store.update_application_runtime(&name, &mut |rt| {
                    rt.is_started = true;
                    rt.pid = pid;
                    rt.err.clear();
                    Ok(())
                }) {
                    tracing::warn!(%name, error = %e, "failed to record started runtime");
                }
                if let Some(post) = self.post_sender() {
                    self.spawn_liveness_monitor(instance, post);
                }
            }
            Err(e) => {
                self.instances.lock().remove(&name);
                if let Err(store_err) = self.store.update_application_runtime(&name, &mut |rt| {
                    rt.to_start = false;
                    rt.err = e.to_string();
                    Ok(())
                }) {
                    tracing::warn!(%name, error = %store_err, "failed to record spawn failure");
                }
            }
        }
        Ok(())
    }

    async fn handle_download_failed(&self, app: Application, reason: String) -> Result<(), BackendError> {
        let name = app.tag.name.clone();
        let slot = self.instances.lock().remove(&name);
        let Some(slot) = slot else {
            tracing::debug!(tag = %app.tag, "download-failed for an already torn-down instance; ignoring");
            return Ok(());
        };

        match slot {
            Slot::Downloading { cancel, .. } => cancel.cancel(),
            Slot::Running(instance) => instance.stop().await,
        }

        if let Err(e) = self.store.update_application_runtime(&name, &mut |rt| {
            rt.to_start = false;
            rt.err = format!("download application failed: {reason}");
            Ok(())
        }) {
            tracing::warn!(%name, error = %e, "failed to record download failure");
        }
        Ok(())
    }

    fn handle_clean_started(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        let still_current = matches!(
            self.instances.lock().get(&tag.name),
            Some(Slot::Running(instance)) if instance.tag.version == tag.version
        );
        if !still_current {
            return Ok(());
        }
        self.instances.lock().remove(&tag.name);
        if let Err(e) = self.store.update_application_runtime(&tag.name, &mut |rt| {
            if rt.tag.version == tag.version {
                rt.is_started = false;
                rt.pid = -1;
            }
            Ok(())
        }) {
            tracing::warn!(name = %tag.name, error = %e, "failed to clear started-application info");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
