// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders for domain types, gated behind `test-support`.

use std::collections::HashMap;

use crate::types::{Application, ApplicationTag, BackendKind, ClusterAppSpec, NativeAppSpec};

/// Builder for [`Application`] test fixtures.
#[cfg(any(test, feature = "test-support"))]
pub struct ApplicationBuilder {
    name: String,
    version: String,
    backend: BackendKind,
    labels: HashMap<String, String>,
    env: HashMap<String, String>,
    native_spec: Option<NativeAppSpec>,
    cluster_spec: Option<ClusterAppSpec>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self {
            name: "svc".into(),
            version: "1.0.0".into(),
            backend: BackendKind::Native,
            labels: HashMap::new(),
            env: HashMap::new(),
            native_spec: None,
            cluster_spec: None,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ApplicationBuilder {
    crate::setters! {
        into {
            name: String,
            version: String,
        }
        set {
            backend: BackendKind,
            labels: HashMap<String, String>,
            env: HashMap<String, String>,
        }
        option {
            native_spec: NativeAppSpec,
            cluster_spec: ClusterAppSpec,
        }
    }

    /// Convenience: a minimal native spec running `argv`.
    pub fn native_command(self, argv: &[&str]) -> Self {
        self.native_spec(NativeAppSpec {
            resource: None,
            command: argv.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn build(self) -> Application {
        Application {
            tag: ApplicationTag::new(self.name, self.version),
            labels: self.labels,
            env: self.env,
            backend: self.backend,
            cluster_spec: self.cluster_spec,
            native_spec: self.native_spec,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }
}
