//! Tic-tac-toe online server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_server::{GameServer, ServerConfig, serve};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Serve(_) => run_server(config).await,
        Command::Config(_) => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Layers file values, the PORT variable and command-line flags.
fn resolve_config(cli: &Cli) -> Result<ServerConfig> {
    let overrides = cli.command.overrides();
    let port = overrides.port.or_else(|| {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
    });
    let config = ServerConfig::load_or_default(&cli.config)?
        .with_overrides(overrides.host.clone(), port);
    config.validate()?;
    Ok(config)
}

/// Run the WebSocket game server until Ctrl-C.
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!(bind = %config.bind_address(), "Starting tic-tac-toe server");
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let server = GameServer::from_config(config);

    serve(listener, server, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
