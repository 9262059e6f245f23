// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fleetctl — demonstrates the engine in-process.
//!
//! Not a client of a running daemon: each invocation opens the same store
//! engine the daemon persists to, constructs the selected backend, runs
//! bootstrap recovery, issues exactly one lifecycle call, and exits. Useful
//! for scripting a sequence of calls for manual exercise (§6.3).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod env;
mod exit_error;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use fleet_adapters::{Backend, ClusterBackend, NativeBackend};
use fleet_core::Store;
use fleet_storage::StoreEngine;

use commands::application::{self, ApplicationArgs};
use commands::config::{self, ConfigArgs};
use exit_error::ExitError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendChoice {
    Native,
    Cluster,
}

#[derive(Parser)]
#[command(name = "fleetctl", about = "application lifecycle engine, demo CLI")]
struct Cli {
    /// Which backend the daemon sharing this store directory is running.
    #[arg(long, value_enum, default_value = "native", global = true)]
    backend: BackendChoice,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Application lifecycle operations
    Application(ApplicationArgs),
    /// Named config bundle operations
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        let code = e.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state_dir = env::state_dir()?;
    let store: Arc<dyn Store> = Arc::new(StoreEngine::open(state_dir.join("db"))?);

    let backend: Arc<dyn Backend> = match cli.backend {
        BackendChoice::Native => Arc::new(NativeBackend::new(store)),
        BackendChoice::Cluster => Arc::new(ClusterBackend::new(store).await?),
    };
    let client = fleet_engine::start(backend).await?;

    match cli.command {
        Command::Application(args) => application::handle(args.command, &client).await,
        Command::Config(args) => config::handle(args.command, &client).await,
    }
}
