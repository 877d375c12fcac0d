use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use finqa::config::AppConfig;
use finqa::core::logging;
use finqa::relay::RelayService;

#[derive(Parser)]
#[command(name = "finqa")]
#[command(about = "Financial document Q&A: relay server and terminal client", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ~/.config/finqa/config.toml)
    #[arg(short, long, global = true, env = "FINQA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay in front of the RAG backend
    Serve {
        /// Listen address, overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Listen port, overrides `server.port`
        #[arg(short, long)]
        port: Option<u16>,

        /// Backend URL, overrides `relay.backend_api_url`
        #[arg(long)]
        backend: Option<String>,
    },

    /// Open the terminal client
    Tui {
        /// Relay URL, overrides `tui.relay_url`
        #[arg(long)]
        relay: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load(Some(&config_path))
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            backend,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if backend.is_some() {
                config.relay.backend_api_url = backend;
            }
            serve(&config).await
        }
        Commands::Tui { relay } => {
            if relay.is_some() {
                config.tui.relay_url = relay;
            }
            let _log_guard = logging::init_tui(&config.data_dir());
            log::info!("{} v{} terminal client starting", finqa::NAME, finqa::VERSION);
            finqa::tui::run(&config).await.context("Terminal client failed")
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    let _log_guard = logging::init(&config.data_dir());
    log::info!("{} v{} relay starting", finqa::NAME, finqa::VERSION);

    let mut relay = RelayService::from_config(config)?;
    relay.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    relay.stop().await;
    Ok(())
}
