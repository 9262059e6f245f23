// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the store, backend, and facade layers.
//!
//! Each layer gets its own `thiserror` enum; [`EngineError`] is the
//! facade-visible union, wrapping the layer below it via `#[from]`.

use thiserror::Error;

/// Errors surfaced by the [`Store`](crate::Store) trait.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store application no found")]
    AppNoFound,
    #[error("store application existed")]
    AppExisted,
    #[error("store application runtime existed")]
    AppRuntimeExisted,
    #[error("store application runtime no found")]
    AppRuntimeNoFound,
    #[error("store config no found")]
    ConfigNoFound,
    #[error("store mutator aborted the write: {0}")]
    MutatorAborted(String),
    #[error("store engine error: {0}")]
    Engine(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
}

/// Errors surfaced by a [`Backend`](crate::Backend) handler.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("application is existed")]
    ApplicationExisted,
    #[error("application is not existed")]
    ApplicationNoExisted,
    #[error("application is started")]
    ApplicationStarted,
    #[error("application is not started")]
    ApplicationNotStarted,
    #[error("config is existed")]
    ConfigExisted,
    #[error("config is not existed")]
    ConfigNoExisted,
    #[error("task event invalid")]
    TaskEventInvalid,
    #[error("backend does not implement this operation")]
    NotImplemented,
    #[error("cluster client error: {0}")]
    Cluster(String),
    #[error("process error: {0}")]
    Process(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the client facade (C6) to callers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("timeout")]
    Timeout,
    #[error("not implemented")]
    NotImplemented,
    #[error("option invalid")]
    OptionInvalid,
    #[error("param invalid")]
    ParamInvalid,
    #[error("client is not started")]
    ClientNotStarted,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("task result invalid")]
    TaskResultInvalid,
}

impl EngineError {
    /// True for `ApplicationNotStarted`, the one error `RemoveApplication`
    /// tolerates from its preceding `StopApplication` (§4.6).
    pub fn is_application_not_started(&self) -> bool {
        matches!(self, EngineError::Backend(BackendError::ApplicationNotStarted))
    }
}
