// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory handle to one supervised native process (§4.5): either a
//! freshly spawned child, or a pid this process merely attached to on
//! bootstrap recovery (`Bind`).

use std::path::{Path, PathBuf};
use std::process::Stdio;

use fleet_core::{Application, ApplicationTag, BackendError};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

enum Handle {
    Spawned(Child),
    Bound(i32),
}

/// A supervised process: either owned (spawned by this engine) or merely
/// attached to (bound to a pid recovered from the store on restart).
pub struct Instance {
    pub tag: ApplicationTag,
    pub dir: PathBuf,
    handle: Mutex<Handle>,
    pub cancel: CancellationToken,
}

impl Instance {
    fn new(tag: ApplicationTag, dir: PathBuf, handle: Handle) -> Self {
        Self { tag, dir, handle: Mutex::new(handle), cancel: CancellationToken::new() }
    }

    /// Spawns `app`'s command, resolving `argv[0]` against `dir` first
    /// (§4.5 spawn policy). Stdout/stderr are redirected to `app.log`.
    pub async fn start(tag: ApplicationTag, dir: PathBuf, app: &Application) -> Result<Self, BackendError> {
        std::fs::create_dir_all(&dir)?;
        let spec = app.native_spec.as_ref().ok_or(BackendError::NotImplemented)?;
        let argv = &spec.command;
        let program = argv.first().ok_or_else(|| {
            BackendError::Process("native spec has an empty command".to_string())
        })?;

        let resolved = resolve_argv0(&dir, program);
        let log_path = dir.join("app.log");
        let log_file = std::fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
        let log_file_err = log_file.try_clone()?;

        let mut command = Command::new(resolved);
        command.args(&argv[1..]);
        command.current_dir(&dir);
        command.stdout(Stdio::from(log_file));
        command.stderr(Stdio::from(log_file_err));
        command.envs(build_env(&dir, &app.env));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Detach into a new process group so parent death does not
            // deliver job-control signals to the child.
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|e| BackendError::Process(format!("spawn failed: {e}")))?;

        Ok(Self::new(tag, dir, Handle::Spawned(child)))
    }

    /// Attaches to a pid recovered from the store (bootstrap restart path).
    /// Probes liveness once; fails if the process is gone.
    pub fn bind(tag: ApplicationTag, dir: PathBuf, pid: i32) -> Result<Self, BackendError> {
        let instance = Self::new(tag, dir, Handle::Bound(pid));
        if !instance.is_alive() {
            return Err(BackendError::Process(format!("pid {pid} is not alive")));
        }
        Ok(instance)
    }

    pub fn pid(&self) -> i32 {
        match &*self.handle.lock() {
            Handle::Spawned(child) => child.id().map(|id| id as i32).unwrap_or(-1),
            Handle::Bound(pid) => *pid,
        }
    }

    /// Non-blocking liveness probe, polled by the monitor every
    /// `FLEETD_LIVENESS_POLL_MS`.
    pub fn is_alive(&self) -> bool {
        match &mut *self.handle.lock() {
            Handle::Spawned(child) => matches!(child.try_wait(), Ok(None)),
            Handle::Bound(pid) => signal::kill(Pid::from_raw(*pid), None).is_ok(),
        }
    }

    /// Best-effort SIGKILL-equivalent termination; cancels any in-flight
    /// download scoped to this instance.
    pub async fn stop(&self) {
        self.cancel.cancel();
        match &mut *self.handle.lock() {
            Handle::Spawned(child) => {
                if let Err(e) = child.start_kill() {
                    tracing::warn!(tag = %self.tag, error = %e, "failed to kill child process");
                }
            }
            Handle::Bound(pid) => {
                if let Err(e) = signal::kill(Pid::from_raw(*pid), Signal::SIGKILL) {
                    tracing::warn!(tag = %self.tag, pid, error = %e, "failed to signal bound process");
                }
            }
        }
    }
}

/// `argv[0]` is resolved against the per-app directory first so a
/// downloaded binary with the conventional name takes precedence; falls
/// back to `argv[0]` verbatim (inheriting `PATH`) when that path is
/// missing or is a directory.
fn resolve_argv0(dir: &Path, argv0: &str) -> String {
    let candidate = dir.join(argv0);
    if candidate.is_file() {
        candidate.to_string_lossy().into_owned()
    } else {
        argv0.to_string()
    }
}

/// Builds the child's environment: the caller's declared `env` map, plus
/// `PATH` augmented with the instance directory using the
/// platform-correct separator (`std::env::join_paths`), so a downloaded
/// binary's siblings are found without rewriting every command.
fn build_env(dir: &Path, declared: &std::collections::HashMap<String, String>) -> Vec<(String, String)> {
    let mut path_entries = vec![dir.to_path_buf()];
    if let Ok(existing) = std::env::var("PATH") {
        path_entries.extend(std::env::split_paths(&existing));
    }
    let joined_path = std::env::join_paths(path_entries)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut env: Vec<(String, String)> = declared.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    env.push(("PATH".to_string(), joined_path));
    env
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
