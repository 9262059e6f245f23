// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain types for the application lifecycle engine: specs, runtime records,
//! and the read-only state projections returned to callers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity pair for an application: a stable handle plus a free-form version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationTag {
    pub name: String,
    pub version: String,
}

impl ApplicationTag {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into() }
    }

    /// Canonical store-key form: `"{name}-{version}"`.
    pub fn tag(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl std::fmt::Display for ApplicationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Which backend realizes an application's lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Cluster,
    Native,
}

crate::simple_display! {
    BackendKind {
        Cluster => "cluster",
        Native => "native",
    }
}

/// One container port mapping in a cluster spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub host_port: i32,
    pub container_port: i32,
    pub protocol: String,
}

/// The source a volume mount resolves to — first-nonempty rule, see
/// [`VolumeSpec::source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub name: String,
    pub mount_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

impl VolumeSpec {
    /// Resolve the mount source by first-nonempty rule: host path, then
    /// config, then secret. Ambiguous input (more than one set) is undefined
    /// by contract — this just picks the first.
    pub fn source(&self) -> VolumeSource<'_> {
        if let Some(p) = self.host_path.as_deref().filter(|s| !s.is_empty()) {
            VolumeSource::HostPath(p)
        } else if let Some(n) = self.config_name.as_deref().filter(|s| !s.is_empty()) {
            VolumeSource::ConfigMap(n)
        } else if let Some(n) = self.secret_name.as_deref().filter(|s| !s.is_empty()) {
            VolumeSource::Secret(n)
        } else {
            VolumeSource::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSource<'a> {
    HostPath(&'a str),
    ConfigMap(&'a str),
    Secret(&'a str),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ServiceType {
    ClusterIp,
    NodePort,
    LoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub service_type: ServiceType,
    pub ports: Vec<PortSpec>,
}

/// Cluster-backend spec: container image, command, ports/volumes, optional service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAppSpec {
    pub image: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,
}

/// A downloadable resource: URL, target filename, and expected MD5 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub url: String,
    pub file_name: String,
    pub md5: String,
}

/// Native-backend spec: optional downloadable resource, argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAppSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceSpec>,
    pub command: Vec<String>,
}

/// User-declared desired spec for one application, keyed by `(name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(flatten)]
    pub tag: ApplicationTag,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub backend: BackendKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_spec: Option<ClusterAppSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_spec: Option<NativeAppSpec>,
}

impl Application {
    pub fn name(&self) -> &str {
        &self.tag.name
    }

    pub fn version(&self) -> &str {
        &self.tag.version
    }
}

/// The engine's reconciliation record for one application name — at most one
/// per name regardless of version (invariant 2 in the data model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRuntime {
    #[serde(flatten)]
    pub tag: ApplicationTag,
    pub to_start: bool,
    pub is_started: bool,
    #[serde(default)]
    pub err: String,
    /// Native backend only; `-1` when unknown or not applicable.
    #[serde(default = "default_pid")]
    pub pid: i32,
}

fn default_pid() -> i32 {
    -1
}

impl ApplicationRuntime {
    pub fn new(tag: ApplicationTag) -> Self {
        Self { tag, to_start: false, is_started: false, err: String::new(), pid: -1 }
    }
}

/// Named blob bundle: filename → text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub data: HashMap<String, String>,
}

/// Read-only per-replica projection returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    pub name: String,
    pub running: bool,
    pub cpu: i64,
    pub mem: i64,
}

/// Read-only projection of a runtime plus its instances, returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub name: String,
    pub version: String,
    pub to_start: bool,
    pub is_started: bool,
    pub err: String,
    pub instances: Vec<InstanceState>,
}

/// Pagination option for `ListApplications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListApplicationsOption {
    pub size: usize,
    /// Exclusive cursor: resume strictly after this key. Empty starts from
    /// the prefix root.
    pub cursor: String,
}
