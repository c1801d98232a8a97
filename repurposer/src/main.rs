/*
repurposer - HTTP server main.rs
Loads configuration, wires the extraction + generation pipeline and serves it over Rocket.
*/

use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use repurposer::processing::{create_llm_provider, Repurposer};
use repurposer::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "repurposer", about = "Turn a blog post URL into social media drafts")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listening port (takes precedence over PORT and config)
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // .env is optional
    let _ = dotenv::dotenv();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let mut config = match load_config(args.config).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let provider = match create_llm_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to initialize LLM provider: {:#}", e);
            return Err(e);
        }
    };

    let repurposer = Repurposer::from_config(&config, provider)?;
    launch_rocket(&config.server, AppState::new(repurposer)).await?;

    info!("Shutdown complete");
    Ok(())
}

/// config.default.toml, then --config or ./config.toml, then environment.
async fn load_config(config_arg: Option<PathBuf>) -> Result<Config> {
    let config = Config::load_layered(Path::new("."), config_arg.as_deref())
        .await?
        .apply_env()?;

    info!(override = ?config_arg, "configuration loaded");
    Ok(config)
}
