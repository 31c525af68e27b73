//! Command-line interface for tictactoe_server.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe online - authoritative WebSocket game server
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Room-based online tic-tac-toe server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults apply if missing)
    #[arg(short, long, global = true, default_value = "tictactoe.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket game server
    Serve(Overrides),

    /// Print the effective configuration as TOML
    Config(Overrides),
}

impl Command {
    /// Command-line overrides shared by every subcommand.
    pub fn overrides(&self) -> &Overrides {
        match self {
            Command::Serve(o) | Command::Config(o) => o,
        }
    }
}

/// Values that take precedence over the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (falls back to the PORT environment variable)
    #[arg(short, long)]
    pub port: Option<u16>,
}
