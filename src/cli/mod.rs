pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::envelope::Normalizer;
use crate::notify::Notifier;
use crate::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "cosmos")]
#[command(about = "Cosmos CLI - talk to the Cosmos API and manage sudo elevation")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Enable admin privileges for the current session")]
    Sudo(commands::sudo::SudoArgs),

    #[command(about = "List storage mounts")]
    Mounts,

    #[command(about = "Send a raw request through the response normalizer")]
    Request(commands::request::RequestArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Client wired the way the hosting shell is expected to do it: one sink,
/// registered before any request can fail.
pub fn build_client(config: &ClientConfig) -> anyhow::Result<ApiClient<HttpTransport>> {
    let notifier = Notifier::new();
    notifier.set_notifier(|message| eprintln!("! {}", message));

    let transport = HttpTransport::from_config(&config.api)?;
    Ok(ApiClient::new(Arc::new(transport), Normalizer::new(notifier)))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();
    let client = build_client(config)?;

    match cli.command {
        Commands::Sudo(args) => commands::sudo::handle(args, client, config, output_format).await,
        Commands::Mounts => commands::mounts::handle(client, output_format).await,
        Commands::Request(args) => commands::request::handle(args, client, output_format).await,
    }
}
