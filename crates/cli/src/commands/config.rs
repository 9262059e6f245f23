// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named config bundle command handlers.

use std::collections::HashMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use fleet_core::Config;

use fleet_engine::Client;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Declare (or overwrite) a named config bundle
    Create {
        name: String,
        /// Repeated key=value file entries
        #[arg(long = "data", required = true)]
        data: Vec<String>,
    },
    /// Remove a named config bundle
    Remove { name: String },
}

pub async fn handle(command: ConfigCommand, client: &Client) -> Result<()> {
    match command {
        ConfigCommand::Create { name, data } => {
            let data = parse_kv_pairs(data)?;
            client.create_config(Config { name: name.clone(), labels: HashMap::new(), data }).await?;
            println!("config '{}' created", name);
        }
        ConfigCommand::Remove { name } => {
            client.remove_config(name.clone()).await?;
            println!("config '{}' removed", name);
        }
    }
    Ok(())
}

fn parse_kv_pairs(pairs: Vec<String>) -> Result<HashMap<String, String>> {
    pairs
        .into_iter()
        .map(|p| match p.split_once('=') {
            Some((k, v)) => Ok((k.to_string(), v.to_string())),
            None => Err(anyhow::anyhow!("expected KEY=VALUE, got '{}'", p)),
        })
        .collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
