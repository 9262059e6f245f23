// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance-state projection (§4.4 get-instance-states): Pods selected by
//! the Deployment's label selector, enriched with per-pod metrics when the
//! metrics API is available.

use fleet_core::InstanceState;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};

use crate::cluster::env::APP_LABEL;

fn pod_metrics_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics"))
}

/// Parses a Kubernetes CPU quantity (`"123m"`, `"1"`) into millicores.
fn parse_cpu_millis(raw: &str) -> i64 {
    if let Some(m) = raw.strip_suffix('m') {
        m.parse().unwrap_or(0)
    } else {
        raw.parse::<f64>().map(|v| (v * 1000.0) as i64).unwrap_or(0)
    }
}

/// Parses a Kubernetes memory quantity (`"128Ki"`, `"64Mi"`) into kilobytes.
fn parse_mem_ki(raw: &str) -> i64 {
    if let Some(v) = raw.strip_suffix("Ki") {
        v.parse().unwrap_or(0)
    } else if let Some(v) = raw.strip_suffix("Mi") {
        v.parse::<i64>().map(|v| v * 1024).unwrap_or(0)
    } else if let Some(v) = raw.strip_suffix("Gi") {
        v.parse::<i64>().map(|v| v * 1024 * 1024).unwrap_or(0)
    } else {
        raw.parse().unwrap_or(0)
    }
}

/// First-container-only usage, matching the source's single-container
/// sampling. Zeroed when the metrics API has no entry for this pod.
async fn first_container_usage(client: &Client, namespace: &str, pod_name: &str) -> (i64, i64) {
    let resource = pod_metrics_resource();
    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), namespace, &resource);
    let Ok(obj) = api.get(pod_name).await else { return (0, 0) };

    let containers = obj.data.get("containers").and_then(|v| v.as_array());
    let Some(containers) = containers else { return (0, 0) };
    let Some(first) = containers.first() else { return (0, 0) };

    let cpu = first
        .get("usage")
        .and_then(|u| u.get("cpu"))
        .and_then(|v| v.as_str())
        .map(parse_cpu_millis)
        .unwrap_or(0);
    let mem = first
        .get("usage")
        .and_then(|u| u.get("memory"))
        .and_then(|v| v.as_str())
        .map(parse_mem_ki)
        .unwrap_or(0);
    (cpu, mem)
}

fn pod_running(pod: &Pod) -> bool {
    pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running")
}

pub async fn instance_states(client: &Client, namespace: &str, app_name: &str) -> Vec<InstanceState> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let lp = ListParams::default().labels(&format!("{APP_LABEL}={app_name}"));
    let list = match pods.list(&lp).await {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(%app_name, error = %err, "failed to list pods for instance states");
            return Vec::new();
        }
    };

    let mut states = Vec::with_capacity(list.items.len());
    for pod in list.items {
        let Some(name) = pod.metadata.name.clone() else { continue };
        let running = pod_running(&pod);
        let (cpu, mem) = first_container_usage(client, namespace, &name).await;
        states.push(InstanceState { name, running, cpu, mem });
    }
    states
}

#[cfg(test)]
#[path = "states_tests.rs"]
mod tests;
