// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fleetd — the application lifecycle daemon.
//!
//! Acquires the single-instance lock, opens the store engine, constructs
//! the selected backend, and runs bootstrap recovery before idling. There
//! is no wire listener here (see §6.3): this binary is the long-running
//! half of the demo; `fleet-cli` is the short-lived half.

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use fleet_adapters::{Backend, ClusterBackend, NativeBackend};
use fleet_core::Store;
use fleet_daemon::{env, DaemonError};
use fleet_storage::StoreEngine;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendChoice {
    Native,
    Cluster,
}

#[derive(Parser)]
#[command(name = "fleetd", about = "application lifecycle daemon")]
struct Args {
    /// Which backend realizes lifecycle operations for this process.
    #[arg(long, value_enum, default_value = "native")]
    backend: BackendChoice,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(e) = run(args).await {
        error!(error = %e, "fleetd failed to start");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), DaemonError> {
    let state_dir = env::state_dir()?;
    std::fs::create_dir_all(&state_dir)?;

    let lock_path = env::lock_path(&state_dir);
    let lock_file = acquire_lock(&lock_path)?;

    let store: Arc<dyn Store> = Arc::new(StoreEngine::open(state_dir.join("db"))?);

    let backend: Arc<dyn Backend> = match args.backend {
        BackendChoice::Native => Arc::new(NativeBackend::new(store)),
        BackendChoice::Cluster => Arc::new(ClusterBackend::new(store).await?),
    };

    let _client = fleet_engine::start(backend).await?;

    info!(backend = ?args.backend, state_dir = %state_dir.display(), "fleetd ready");
    println!("READY");

    tokio::signal::ctrl_c().await?;
    info!("received interrupt, shutting down");

    drop(lock_file);
    Ok(())
}

/// Acquires the single-instance lock and stamps it with this process's pid.
fn acquire_lock(lock_path: &std::path::Path) -> Result<std::fs::File, DaemonError> {
    use fs2::FileExt;

    let lock_file =
        std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(lock_path)?;
    lock_file.try_lock_exclusive().map_err(DaemonError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
