// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleet-core: shared domain types, error taxonomy, and the `Store` contract
//! for the application lifecycle engine.

pub mod macros;

pub mod error;
pub mod store;
pub mod task;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{BackendError, EngineError, StoreError};
pub use store::Store;
pub use task::{InternalTask, Task, TaskOutput, TaskReply, TaskSender};
pub use types::{
    Application, ApplicationRuntime, ApplicationState, ApplicationTag, BackendKind,
    ClusterAppSpec, Config, InstanceState, ListApplicationsOption, NativeAppSpec, PortSpec,
    ResourceSpec, ServiceSpec, ServiceType, VolumeSource, VolumeSpec,
};
