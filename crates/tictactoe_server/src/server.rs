//! HTTP router and shared server context.

use crate::config::ServerConfig;
use crate::connection_manager::ConnectionManager;
use crate::game_manager::GameManager;
use crate::session;
use axum::body::Body;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::Request;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use derive_getters::Getters;
use std::future::Future;
use std::sync::Arc;
use tictactoe_rules::RoomId;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{info, instrument};

/// Path of the game socket.
pub const WS_ROUTE: &str = "/ws/{room_id}/{player_name}";

/// Server-wide context handed to every session.
///
/// Cloning is cheap; all clones share the same registries.
#[derive(Debug, Clone, Getters, derive_new::new)]
pub struct GameServer {
    games: GameManager,
    connections: ConnectionManager,
    config: Arc<ServerConfig>,
}

impl GameServer {
    /// Builds empty registries for `config`.
    #[instrument(skip(config))]
    pub fn from_config(config: ServerConfig) -> Self {
        info!("Creating game server");
        let connections = ConnectionManager::new(config.draw_label());
        Self::new(GameManager::new(), connections, Arc::new(config))
    }
}

/// Builds the router serving the game socket.
pub fn router(server: GameServer) -> Router {
    Router::new()
        .route(WS_ROUTE, get(ws_handler))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(server)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((room_id, player_name)): Path<(RoomId, String)>,
    State(server): State<GameServer>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::run(socket, room_id, player_name, server))
}

/// Serves `server` on `listener` until `shutdown` resolves.
#[instrument(skip_all)]
pub async fn serve(
    listener: TcpListener,
    server: GameServer,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Server ready at ws://{}{}", addr, WS_ROUTE);
    }
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await
}
