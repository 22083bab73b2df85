// Copyright (c) 2024 Botho Foundation

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{net::IpAddr, path::PathBuf};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anla_node::{
    commands::{self, run::Overrides},
    NodeConfig, PeerEntry,
};

#[derive(Parser)]
#[command(name = "anla-node")]
#[command(about = "Anla anonymity overlay router")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "anla-node.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration file with a new key
    Init {
        /// Listen host
        #[arg(long)]
        host: Option<IpAddr>,

        /// Listen port
        #[arg(long)]
        port: Option<u16>,

        /// Replace an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Run the router
    Run {
        /// Listen host
        #[arg(long)]
        host: Option<IpAddr>,

        /// Listen port
        #[arg(long)]
        port: Option<u16>,

        /// Secret exponent as 512 hex characters
        #[arg(long)]
        exponent: Option<String>,

        /// Peer to link to, as host:port:public_key (repeatable)
        #[arg(long = "peer")]
        peers: Vec<PeerEntry>,
    },

    /// Print this node's peer entry
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    match cli.command {
        Commands::Init { host, port, force } => {
            commands::init::run(&cli.config, host, port, force)?;
            Ok(())
        }
        Commands::Run {
            host,
            port,
            exponent,
            peers,
        } => {
            let mut config = if cli.config.exists() {
                NodeConfig::from_file(&cli.config)?
            } else {
                warn!(path = %cli.config.display(), "No configuration file, using defaults");
                NodeConfig::default()
            };
            Overrides {
                host,
                port,
                exponent,
                peers,
            }
            .apply(&mut config)?;

            commands::run::run(config).await
        }
        Commands::Show => {
            let config = NodeConfig::from_file(&cli.config)?;
            println!("{}", commands::show::run(&config)?);
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
