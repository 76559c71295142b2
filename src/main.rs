//! WireMock Stubs - CLI Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;
use wiremock_stubs::{AdminClient, StubMapping, WireMockConfig};

#[derive(Parser, Debug)]
#[command(
    name = "wiremock-stubs",
    about = "Manage stub mappings on a running WireMock server",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "wiremock.yaml")]
    config: PathBuf,

    /// Override the configured host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reset the server and verify it answers
    Init,
    /// Print all mappings as JSON
    List,
    /// Print one mapping as JSON
    Get { id: Uuid },
    /// Create or update the mappings in a YAML or JSON file
    Apply { file: PathBuf },
    /// Delete one mapping
    Delete { id: Uuid },
    /// Delete all mappings
    DeleteAll,
    /// Restore the server's startup mappings
    Reset,
}

/// Accepted layouts for `apply` input files.
#[derive(Deserialize)]
#[serde(untagged)]
enum MappingFile {
    Envelope { mappings: Vec<StubMapping> },
    Many(Vec<StubMapping>),
    One(Box<StubMapping>),
}

impl MappingFile {
    fn into_mappings(self) -> Vec<StubMapping> {
        match self {
            MappingFile::Envelope { mappings } | MappingFile::Many(mappings) => mappings,
            MappingFile::One(mapping) => vec![*mapping],
        }
    }
}

fn load_config(args: &Args) -> Result<WireMockConfig> {
    let mut config = if args.config.exists() {
        info!(path = ?args.config, "Loading configuration");
        WireMockConfig::from_file(&args.config)?
    } else {
        WireMockConfig::default()
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

// Not `#[tokio::main]`: the client blocks on its own runtime
fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args)?;
    let client = AdminClient::new(config)?;

    match args.command {
        Command::Init => {
            client.initialize()?;
            println!("WireMock server is ready");
        }
        Command::List => {
            let mappings = client.list_mappings()?;
            println!("{}", serde_json::to_string_pretty(&mappings)?);
        }
        Command::Get { id } => match client.get_mapping(id)? {
            Some(mapping) => println!("{}", serde_json::to_string_pretty(&mapping)?),
            None => anyhow::bail!("Mapping not found: {}", id),
        },
        Command::Apply { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mappings = serde_yaml::from_str::<MappingFile>(&content)
                .with_context(|| format!("Failed to parse mappings in {}", file.display()))?
                .into_mappings();

            // Learn existing ids so re-applying a file updates in place
            client.list_mappings()?;
            for mapping in &mappings {
                client.create_or_update(mapping)?;
            }
            println!("Applied {} mappings", mappings.len());
        }
        Command::Delete { id } => {
            client.delete_mapping(id)?;
            println!("Deleted mapping {}", id);
        }
        Command::DeleteAll => {
            client.delete_all()?;
            println!("Deleted all mappings");
        }
        Command::Reset => {
            client.reset()?;
            println!("Reset mappings");
        }
    }

    Ok(())
}
