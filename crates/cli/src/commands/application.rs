// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application lifecycle command handlers.

use std::collections::HashMap;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use fleet_core::{
    Application, ApplicationTag, BackendKind, ClusterAppSpec, ListApplicationsOption,
    NativeAppSpec, ResourceSpec,
};

use fleet_engine::Client;

#[derive(Args)]
pub struct ApplicationArgs {
    #[command(subcommand)]
    pub command: ApplicationCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SpecBackend {
    Native,
    Cluster,
}

#[derive(Subcommand)]
pub enum ApplicationCommand {
    /// Declare a new application's desired spec
    Create {
        name: String,
        version: String,
        #[arg(long, value_enum)]
        backend: SpecBackend,
        /// Cluster backend: container image
        #[arg(long)]
        image: Option<String>,
        /// Native backend: argv, e.g. --command /bin/sleep --command 30
        #[arg(long = "command")]
        command: Vec<String>,
        /// Native backend: downloadable resource as url,file_name,md5
        #[arg(long)]
        resource: Option<String>,
        /// Repeated key=value environment entries
        #[arg(long = "env")]
        env: Vec<String>,
    },
    /// Start an application
    Start { name: String, version: String },
    /// Restart an application (reclaims an already-running instance)
    Restart { name: String, version: String },
    /// Stop a running application
    Stop { name: String, version: String },
    /// Remove an application's desired spec entirely
    Remove { name: String, version: String },
    /// List declared applications
    List {
        #[arg(long, default_value_t = 50)]
        size: usize,
        #[arg(long, default_value = "")]
        cursor: String,
    },
    /// Show runtime state and live instances for one or more applications
    States {
        /// Repeated name:version tags
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

pub async fn handle(command: ApplicationCommand, client: &Client) -> Result<()> {
    match command {
        ApplicationCommand::Create { name, version, backend, image, command, resource, env } => {
            let app = build_application(name, version, backend, image, command, resource, env)?;
            let tag = app.tag.clone();
            client.create_application(app).await?;
            println!("application '{}' created", tag);
        }
        ApplicationCommand::Start { name, version } => {
            let tag = ApplicationTag::new(name, version);
            client.start_application(tag.clone()).await?;
            println!("application '{}' started", tag);
        }
        ApplicationCommand::Restart { name, version } => {
            let tag = ApplicationTag::new(name, version);
            client.restart_application(tag.clone()).await?;
            println!("application '{}' restarted", tag);
        }
        ApplicationCommand::Stop { name, version } => {
            let tag = ApplicationTag::new(name, version);
            client.stop_application(tag.clone()).await?;
            println!("application '{}' stopped", tag);
        }
        ApplicationCommand::Remove { name, version } => {
            let tag = ApplicationTag::new(name, version);
            client.remove_application(tag.clone()).await?;
            println!("application '{}' removed", tag);
        }
        ApplicationCommand::List { size, cursor } => {
            let (tags, next_cursor) =
                client.list_applications(ListApplicationsOption { size, cursor }).await?;
            for tag in &tags {
                println!("{}", tag);
            }
            println!("next cursor: {}", next_cursor);
        }
        ApplicationCommand::States { tags } => {
            let tags = tags
                .into_iter()
                .map(|t| match t.split_once(':') {
                    Some((name, version)) => Ok(ApplicationTag::new(name, version)),
                    None => Err(anyhow::anyhow!("expected NAME:VERSION, got '{}'", t)),
                })
                .collect::<Result<Vec<_>>>()?;
            let states = client.get_application_states(tags).await?;
            println!("{}", serde_json::to_string_pretty(&states)?);
        }
    }
    Ok(())
}

fn build_application(
    name: String,
    version: String,
    backend: SpecBackend,
    image: Option<String>,
    command: Vec<String>,
    resource: Option<String>,
    env: Vec<String>,
) -> Result<Application> {
    let env = parse_kv_pairs(env)?;

    let (backend, cluster_spec, native_spec) = match backend {
        SpecBackend::Cluster => {
            let image = image.ok_or_else(|| anyhow::anyhow!("--image is required for --backend cluster"))?;
            (
                BackendKind::Cluster,
                Some(ClusterAppSpec { image, command, ports: Vec::new(), volumes: Vec::new(), service: None }),
                None,
            )
        }
        SpecBackend::Native => {
            let resource = resource.map(|raw| parse_resource(&raw)).transpose()?;
            (BackendKind::Native, None, Some(NativeAppSpec { resource, command }))
        }
    };

    Ok(Application {
        tag: ApplicationTag::new(name, version),
        labels: HashMap::new(),
        env,
        backend,
        cluster_spec,
        native_spec,
    })
}

fn parse_resource(raw: &str) -> Result<ResourceSpec> {
    let mut parts = raw.splitn(3, ',');
    let url = parts.next().filter(|s| !s.is_empty());
    let file_name = parts.next().filter(|s| !s.is_empty());
    let md5 = parts.next().filter(|s| !s.is_empty());
    match (url, file_name, md5) {
        (Some(url), Some(file_name), Some(md5)) => {
            Ok(ResourceSpec { url: url.to_string(), file_name: file_name.to_string(), md5: md5.to_string() })
        }
        _ => Err(anyhow::anyhow!("--resource expects 'url,file_name,md5'")),
    }
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
#[path = "application_tests.rs"]
mod tests;
