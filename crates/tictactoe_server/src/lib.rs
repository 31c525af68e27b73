//! Authoritative server for room-based online tic-tac-toe.
//!
//! Clients connect to `/ws/{room_id}/{player_name}` over WebSocket. The first
//! player in a room plays `O`, the second `X`; every mutation of a room is
//! broadcast to all of its sockets as a `state` message.
//!
//! # Architecture
//!
//! - **GameManager**: room registry, one [`Game`](tictactoe_rules::Game) per room
//! - **ConnectionManager**: live sockets per room and broadcast fan-out
//! - **Session**: per-socket loop translating protocol messages into game calls
//! - **GameServer**: the shared context handed to every session
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::{GameServer, ServerConfig, serve};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! let server = GameServer::from_config(config);
//! serve(listener, server, std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod connection_manager;
mod game_manager;
mod protocol;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_DRAW_LABEL, MAX_PING_SECS, ServerConfig};

// Crate-level exports - Registries
pub use connection_manager::{ConnectionId, ConnectionManager, ConnectionSender};
pub use game_manager::GameManager;

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};

// Crate-level exports - Server
pub use server::{GameServer, WS_ROUTE, router, serve};
pub use session::SessionEnd;
