// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small free functions resolving cluster backend configuration from the
//! environment, matching the daemon crate's `env.rs` convention.

/// Cluster namespace for managed Deployments/Services/ConfigMaps.
pub fn namespace() -> String {
    std::env::var("FLEETD_NAMESPACE").unwrap_or_else(|_| "default".to_string())
}

/// Label key carrying an application's stable name on every managed resource.
pub const APP_LABEL: &str = "backend-app";

/// Label key carrying an application's version on every managed resource.
pub const VERSION_LABEL: &str = "backend-app-version";
