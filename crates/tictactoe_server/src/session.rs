//! Per-connection protocol loop.
//!
//! One session runs per accepted socket:
//!
//! 1. Ask the [`GameManager`](crate::GameManager) for a seat; on rejection send
//!    a single `error` message and close.
//! 2. Register with the [`ConnectionManager`](crate::ConnectionManager) and
//!    broadcast the room's state.
//! 3. Handle `get_state` / `make_move` until the socket closes, errors, or
//!    stops answering keep-alive pings.
//! 4. Vacate the seat, tell the remaining players, unregister. This runs even
//!    if step 3 panics.

use crate::connection_manager::ConnectionSender;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::server::GameServer;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{FutureExt, SinkExt, StreamExt};
use std::panic::AssertUnwindSafe;
use tictactoe_rules::{GameStatus, RoomId};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Why a session's receive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SessionEnd {
    /// The client closed the socket.
    #[display("closed by client")]
    Closed,
    /// Reading from the socket failed.
    #[display("transport error")]
    TransportError,
    /// A keep-alive ping went unanswered.
    #[display("keep-alive timeout")]
    TimedOut,
    /// The receive loop panicked.
    #[display("session panicked")]
    Panicked,
}

/// Serves one socket for `player_name` in `room_id` until it goes away.
#[instrument(skip(socket, server))]
pub async fn run(socket: WebSocket, room_id: RoomId, player_name: String, server: GameServer) {
    if let Err(e) = server.games().connect_to_game(room_id, &player_name).await {
        reject(socket, ServerMessage::from(e)).await;
        return;
    }

    let (sink, stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_frames(sink, rx));

    let connection = server.connections().connect(room_id, &player_name, tx.clone());
    server
        .connections()
        .broadcast_game_state(server.games(), room_id)
        .await;

    let session = Session {
        room_id,
        player_name: &player_name,
        server: &server,
        outbound: &tx,
    };
    let end = AssertUnwindSafe(session.receive_loop(stream))
        .catch_unwind()
        .await
        .unwrap_or(SessionEnd::Panicked);
    info!(%end, "Session ending");

    server.games().disconnect_from_game(room_id, &player_name).await;
    server
        .connections()
        .broadcast_game_state(server.games(), room_id)
        .await;
    server.connections().disconnect(room_id, &player_name, connection);

    drop(tx);
    if let Err(e) = writer.await {
        warn!(error = %e, "Writer task failed");
    }
}

/// Sends the rejection and closes without registering anything.
async fn reject(mut socket: WebSocket, message: ServerMessage) {
    match message.to_text() {
        Ok(text) => {
            if let Err(e) = socket.send(Message::Text(text.into())).await {
                debug!(error = %e, "Failed to send rejection");
            }
        }
        Err(e) => warn!(error = %e, "Failed to encode rejection"),
    }
    if let Err(e) = socket.send(Message::Close(None)).await {
        debug!(error = %e, "Failed to close rejected socket");
    }
}

/// Drains the outbound queue into the socket until either side goes away.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = sink.send(frame).await {
            warn!(error = %e, "Socket send failed");
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!(error = %e, "Socket close failed");
    }
}

struct Session<'a> {
    room_id: RoomId,
    player_name: &'a str,
    server: &'a GameServer,
    outbound: &'a ConnectionSender,
}

impl Session<'_> {
    async fn receive_loop(&self, mut stream: SplitStream<WebSocket>) -> SessionEnd {
        let config = self.server.config();
        let mut ping = tokio::time::interval_at(
            Instant::now() + config.ping_interval(),
            config.ping_interval(),
        );
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Set while a ping is outstanding; any inbound frame clears it.
        let mut pong_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                frame = stream.next() => {
                    let frame = match frame {
                        Some(Ok(frame)) => frame,
                        Some(Err(e)) => {
                            debug!(error = %e, "Socket read failed");
                            return SessionEnd::TransportError;
                        }
                        None => return SessionEnd::Closed,
                    };
                    pong_deadline = None;
                    match frame {
                        Message::Text(text) => self.handle_text(text.as_str()).await,
                        Message::Close(_) => return SessionEnd::Closed,
                        Message::Binary(_) => debug!("Ignoring binary frame"),
                        Message::Ping(_) | Message::Pong(_) => {}
                    }
                }
                _ = tokio::time::sleep_until(pong_deadline.unwrap_or_else(Instant::now)),
                    if pong_deadline.is_some() =>
                {
                    warn!("Peer stopped answering pings");
                    return SessionEnd::TimedOut;
                }
                _ = ping.tick() => {
                    if self.outbound.send(Message::Ping(Bytes::new())).is_err() {
                        return SessionEnd::TransportError;
                    }
                    if pong_deadline.is_none() {
                        pong_deadline = Some(Instant::now() + config.ping_timeout());
                    }
                }
            }
        }
    }

    async fn handle_text(&self, text: &str) {
        match ClientMessage::parse(text) {
            Ok(ClientMessage::GetState) => {
                self.server
                    .connections()
                    .broadcast_game_state(self.server.games(), self.room_id)
                    .await;
            }
            Ok(ClientMessage::MakeMove { x, y }) => self.play(x, y).await,
            Err(e) => debug!(error = %e, "Dropping inbound message"),
        }
    }

    /// Applies the move and broadcasts the result under the room lock.
    ///
    /// A finished game is announced and then reset for the next round.
    #[instrument(skip(self), fields(room_id = self.room_id, player = %self.player_name))]
    async fn play(&self, x: i64, y: i64) {
        let connections = self.server.connections();
        let applied = self
            .server
            .games()
            .with_room(self.room_id, |game| {
                if let Err(e) = game.make_move(self.player_name, x, y) {
                    debug!(error = %e, "Move rejected");
                }
                connections.broadcast_state_of(self.room_id, game);
                if game.status() == GameStatus::Finished {
                    connections.broadcast_game_over_of(self.room_id, game);
                    game.reset();
                }
            })
            .await;
        if applied.is_none() {
            debug!("Room vanished before move");
        }
    }
}
