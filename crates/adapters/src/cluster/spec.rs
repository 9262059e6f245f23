// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping from an `Application`/`Config` to cluster resource manifests
//! (§4.4): a Deployment named after the application, an optional sibling
//! Service, and a ConfigMap per named config.

use std::collections::BTreeMap;

use fleet_core::{Application, ClusterAppSpec, Config, ServiceType, VolumeSource};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, EnvVar, HostPathVolumeSource,
    PodSpec, PodTemplateSpec, SecretVolumeSource, Service, ServicePort, ServiceSpec, Volume,
    VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::cluster::env::{APP_LABEL, VERSION_LABEL};

/// Labels applied to every resource this backend manages for `app`: the
/// caller's own labels plus the two identity labels the watch ingest and
/// pod/service selectors rely on.
fn app_labels(app: &Application) -> BTreeMap<String, String> {
    let mut labels: BTreeMap<String, String> = app.labels.clone().into_iter().collect();
    labels.insert(APP_LABEL.to_string(), app.name().to_string());
    labels.insert(VERSION_LABEL.to_string(), app.version().to_string());
    labels
}

fn selector_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

fn load_container_specs(app: &Application, spec: &ClusterAppSpec) -> Vec<Container> {
    let env: Vec<EnvVar> = app
        .env
        .iter()
        .map(|(k, v)| EnvVar { name: k.clone(), value: Some(v.clone()), ..Default::default() })
        .collect();

    let ports: Vec<ContainerPort> = spec
        .ports
        .iter()
        .map(|p| ContainerPort {
            name: Some(p.name.clone()),
            container_port: p.container_port,
            protocol: Some(p.protocol.clone()),
            ..Default::default()
        })
        .collect();

    let volume_mounts: Vec<VolumeMount> = spec
        .volumes
        .iter()
        .map(|v| VolumeMount { name: v.name.clone(), mount_path: v.mount_path.clone(), ..Default::default() })
        .collect();

    vec![Container {
        name: app.name().to_string(),
        image: Some(spec.image.clone()),
        command: if spec.command.is_empty() { None } else { Some(spec.command.clone()) },
        env: if env.is_empty() { None } else { Some(env) },
        ports: if ports.is_empty() { None } else { Some(ports) },
        volume_mounts: if volume_mounts.is_empty() { None } else { Some(volume_mounts) },
        image_pull_policy: Some("IfNotPresent".to_string()),
        ..Default::default()
    }]
}

/// Each volume mount resolves to exactly one source by the
/// first-nonempty rule in [`fleet_core::VolumeSpec::source`]; an
/// unresolvable (all-empty) spec is skipped rather than rejected, since
/// the contract leaves that case undefined.
fn load_volume_specs(spec: &ClusterAppSpec) -> Vec<Volume> {
    spec.volumes
        .iter()
        .filter_map(|v| {
            let volume_source = match v.source() {
                VolumeSource::HostPath(path) => k8s_openapi::api::core::v1::VolumeSource {
                    host_path: Some(HostPathVolumeSource { path: path.to_string(), ..Default::default() }),
                    ..Default::default()
                },
                VolumeSource::ConfigMap(name) => k8s_openapi::api::core::v1::VolumeSource {
                    config_map: Some(ConfigMapVolumeSource {
                        name: name.to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                VolumeSource::Secret(name) => k8s_openapi::api::core::v1::VolumeSource {
                    secret: Some(SecretVolumeSource {
                        secret_name: Some(name.to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                VolumeSource::None => return None,
            };
            Some(Volume { name: v.name.clone(), volume_source: Some(volume_source), ..Default::default() })
        })
        .collect()
}

fn load_deployment_spec(app: &Application, spec: &ClusterAppSpec, namespace: &str) -> Deployment {
    let labels = app_labels(app);
    let selector = selector_labels(app.name());

    let pod_spec = PodSpec {
        containers: load_container_specs(app, spec),
        volumes: {
            let volumes = load_volume_specs(spec);
            if volumes.is_empty() { None } else { Some(volumes) }
        },
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(app.name().to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(selector.into_iter().collect()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels.into_iter().collect()), ..Default::default() }),
                spec: Some(pod_spec),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_service(app: &Application, spec: &ClusterAppSpec, namespace: &str) -> Option<Service> {
    let svc = spec.service.as_ref()?;
    let ports: Vec<ServicePort> = svc
        .ports
        .iter()
        .map(|p| ServicePort {
            name: Some(p.name.clone()),
            port: p.host_port,
            target_port: Some(IntOrString::Int(p.container_port)),
            protocol: Some(p.protocol.clone()),
            ..Default::default()
        })
        .collect();

    Some(Service {
        metadata: ObjectMeta {
            name: Some(app.name().to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(app_labels(app).into_iter().collect()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(selector_labels(app.name()).into_iter().collect()),
            ports: Some(ports),
            type_: Some(
                match svc.service_type {
                    ServiceType::ClusterIp => "ClusterIP",
                    ServiceType::NodePort => "NodePort",
                    ServiceType::LoadBalancer => "LoadBalancer",
                }
                .to_string(),
            ),
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub fn build_deployment(app: &Application, spec: &ClusterAppSpec, namespace: &str) -> Deployment {
    load_deployment_spec(app, spec, namespace)
}

pub fn build_service_spec(app: &Application, spec: &ClusterAppSpec, namespace: &str) -> Option<Service> {
    build_service(app, spec, namespace)
}

pub fn build_config_map(config: &Config, namespace: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(config.labels.clone().into_iter().collect()),
            ..Default::default()
        },
        data: Some(config.data.clone().into_iter().collect()),
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
