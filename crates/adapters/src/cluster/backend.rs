// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cluster backend (C4): reconciles applications onto Deployments,
//! Services, and ConfigMaps, and ingests Deployment watch events.

use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, BackendError, Config,
    InstanceState, InternalTask, ListApplicationsOption, Store, StoreError, TaskSender,
};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};

use crate::backend::Backend;
use crate::cluster::{env, spec, states, watch};

/// Reconciles `Application`/`Config` records onto a Kubernetes namespace.
pub struct ClusterBackend {
    store: Arc<dyn Store>,
    client: Client,
    namespace: String,
}

impl ClusterBackend {
    pub async fn new(store: Arc<dyn Store>) -> Result<Self, BackendError> {
        let client = Client::try_default()
            .await
            .map_err(|e| BackendError::Cluster(format!("failed to create kube client: {e}")))?;
        Ok(Self { store, client, namespace: env::namespace() })
    }

    fn deployments(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn services(&self) -> Api<Service> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn config_maps(&self) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// Insert-or-replace the runtime record for `tag`, since `Store::add_*`
    /// fails on an existing record and `update_*` fails on a missing one.
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

    fn set_runtime_err(&self, name: &str, message: impl Into<String>) {
        let message = message.into();
        if let Err(e) = self.store.update_application_runtime(name, &mut |rt| {
            rt.err = message.clone();
            Ok(())
        }) {
            tracing::warn!(%name, error = %e, "failed to record runtime error");
        }
    }
}

#[async_trait]
impl Backend for ClusterBackend {
    async fn init(&self, post: TaskSender) -> Result<(), BackendError> {
        let client = self.client.clone();
        let namespace = self.namespace.clone();
        tokio::spawn(async move {
            watch::run(client, namespace, post).await;
        });
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
            if rt.tag.version == tag.version && rt.is_started && self.deployments().get(&tag.name).await.is_ok()
            {
                return Ok(());
            }
        }

        let name = tag.name.clone();
        let _ = self.store.update_application_runtime(&name, &mut |rt| {
            rt.is_started = false;
            Ok(())
        });

        let app = self.store.get_application(&tag).map_err(|e| match e {
            StoreError::AppNoFound => BackendError::ApplicationNoExisted,
            other => other.into(),
        })?;
        let spec_ = app.cluster_spec.as_ref().ok_or(BackendError::NotImplemented)?;

        let mut rt = ApplicationRuntime::new(tag.clone());
        rt.to_start = true;
        self.upsert_runtime(rt)?;

        if let Some(service) = spec::build_service_spec(&app, spec_, &self.namespace) {
            if let Err(e) = self.services().create(&PostParams::default(), &service).await {
                let message = format!("service create failed: {e}");
                self.set_runtime_err(&name, &message);
                return Err(BackendError::Cluster(message));
            }
        }

        let deployment = spec::build_deployment(&app, spec_, &self.namespace);
        if let Err(e) = self.deployments().create(&PostParams::default(), &deployment).await {
            if spec_.service.is_some() {
                if let Err(del_err) = self.services().delete(&name, &DeleteParams::default()).await {
                    tracing::warn!(%name, error = %del_err, "failed to clean up service after deployment create failure");
                }
            }
            let message = format!("deployment create failed: {e}");
            self.set_runtime_err(&name, &message);
            return Err(BackendError::Cluster(message));
        }

        Ok(())
    }

    async fn restart_application(&self, tag: ApplicationTag) -> Result<(), BackendError> {
        if let Ok(rt) = self.store.get_application_runtime(&tag.name) {
            if rt.tag.version == tag.version && rt.is_started && self.deployments().get(&tag.name).await.is_ok()
            {
                return Ok(());
            }
        }
        let _ = self.store.update_application_runtime(&tag.name, &mut |rt| {
            rt.is_started = false;
            Ok(())
        });
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

        if let Err(e) = self.services().delete(&tag.name, &DeleteParams::default()).await {
            tracing::warn!(name = %tag.name, error = %e, "failed to delete service during stop");
        }
        if let Err(e) = self.deployments().delete(&tag.name, &DeleteParams::default()).await {
            tracing::warn!(name = %tag.name, error = %e, "failed to delete deployment during stop");
        }
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
            let instances: Vec<InstanceState> = if rt.is_started {
                states::instance_states(&self.client, &self.namespace, &tag.name).await
            } else {
                Vec::new()
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
        let config_map = spec::build_config_map(&config, &self.namespace);
        self.config_maps()
            .create(&PostParams::default(), &config_map)
            .await
            .map_err(|e| BackendError::Cluster(format!("config map create failed: {e}")))?;
        Ok(())
    }

    async fn remove_config(&self, name: String) -> Result<(), BackendError> {
        if !self.store.has_config(&name)? {
            return Err(BackendError::ConfigNoExisted);
        }
        self.store.remove_config(&name)?;
        if let Err(e) = self.config_maps().delete(&name, &DeleteParams::default()).await {
            tracing::warn!(%name, error = %e, "failed to delete config map");
        }
        Ok(())
    }

    async fn handle_internal(&self, task: InternalTask) -> Result<(), BackendError> {
        match task {
            InternalTask::MarkStarted(tag) => {
                if let Err(e) = self.store.update_application_runtime(&tag.name, &mut |rt| {
                    if rt.tag.version == tag.version {
                        rt.is_started = true;
                        rt.err.clear();
                    }
                    Ok(())
                }) {
                    tracing::warn!(name = %tag.name, error = %e, "mark-started failed");
                }
                Ok(())
            }
            InternalTask::MarkStopped(tag) => {
                if let Err(e) = self.store.update_application_runtime(&tag.name, &mut |rt| {
                    if rt.tag.version == tag.version {
                        rt.is_started = false;
                    }
                    Ok(())
                }) {
                    tracing::warn!(name = %tag.name, error = %e, "mark-stopped failed");
                }
                Ok(())
            }
            _ => Err(BackendError::NotImplemented),
        }
    }
}
