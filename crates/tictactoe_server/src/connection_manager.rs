//! Live sockets per room, and broadcast fan-out.

use crate::game_manager::GameManager;
use crate::protocol::ServerMessage;
use crate::config::DEFAULT_DRAW_LABEL;
use axum::extract::ws::Message;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tictactoe_rules::{Game, GameStatus, RoomId};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Sending half of a connection's outbound queue.
///
/// The session owns the socket; its writer task drains this queue. Holding a
/// sender never keeps a dead socket alive: once the writer stops, sends fail.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// Identity of one registered socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("conn-{}", _0)]
pub struct ConnectionId(u64);

#[derive(Debug)]
struct Connection {
    id: ConnectionId,
    sender: ConnectionSender,
}

type Registry = HashMap<RoomId, HashMap<String, Connection>>;

/// Maps room id to player name to the socket currently serving that player.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    rooms: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
    draw_label: Arc<str>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(DEFAULT_DRAW_LABEL)
    }
}

impl ConnectionManager {
    /// Creates an empty registry; `draw_label` names the winner of a drawn game.
    #[instrument]
    pub fn new(draw_label: &str) -> Self {
        info!("Creating connection manager");
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            draw_label: Arc::from(draw_label),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.rooms.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a socket for `player_name`, replacing any stale one.
    #[instrument(skip(self, sender))]
    pub fn connect(
        &self,
        room_id: RoomId,
        player_name: &str,
        sender: ConnectionSender,
    ) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let previous = self
            .write()
            .entry(room_id)
            .or_default()
            .insert(player_name.to_string(), Connection { id, sender });
        if let Some(stale) = previous {
            debug!(stale = %stale.id, "Replaced stale connection");
        }
        info!(%id, "Connection registered");
        id
    }

    /// Removes the mapping if it still belongs to `id`; prunes an empty room.
    ///
    /// A player who already reconnected on a fresh socket keeps that socket.
    #[instrument(skip(self))]
    pub fn disconnect(&self, room_id: RoomId, player_name: &str, id: ConnectionId) -> bool {
        let mut rooms = self.write();
        let Some(players) = rooms.get_mut(&room_id) else {
            return false;
        };
        if players.get(player_name).is_none_or(|c| c.id != id) {
            debug!("Mapping already replaced");
            return false;
        }
        players.remove(player_name);
        if players.is_empty() {
            rooms.remove(&room_id);
            debug!("Room bucket pruned");
        }
        info!("Connection removed");
        true
    }

    /// Sends `message` to every socket in the room.
    ///
    /// A failed recipient is logged and skipped. Returns how many accepted it.
    #[instrument(skip(self, message))]
    pub fn broadcast(&self, room_id: RoomId, message: &ServerMessage) -> usize {
        let text = match message.to_text() {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Dropping broadcast");
                return 0;
            }
        };

        let rooms = self.read();
        let Some(players) = rooms.get(&room_id) else {
            debug!("No sockets in room");
            return 0;
        };

        let mut delivered = 0;
        for (name, connection) in players {
            match connection.sender.send(Message::Text(text.clone().into())) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(player = %name, id = %connection.id, "Recipient gone, skipping"),
            }
        }
        debug!(delivered, recipients = players.len(), "Broadcast sent");
        delivered
    }

    /// Broadcasts the state of an already locked game.
    pub fn broadcast_state_of(&self, room_id: RoomId, game: &Game) -> usize {
        self.broadcast(room_id, &ServerMessage::State(game.snapshot()))
    }

    /// Broadcasts the `game_over` notice if the game is finished.
    pub fn broadcast_game_over_of(&self, room_id: RoomId, game: &Game) -> usize {
        match (game.status(), game.outcome()) {
            (GameStatus::Finished, Some(outcome)) => {
                self.broadcast(room_id, &ServerMessage::game_over(outcome, &self.draw_label))
            }
            _ => 0,
        }
    }

    /// Fetches the room's current snapshot and broadcasts it.
    pub async fn broadcast_game_state(&self, games: &GameManager, room_id: RoomId) -> usize {
        games
            .with_room(room_id, |game| self.broadcast_state_of(room_id, game))
            .await
            .unwrap_or_default()
    }

    /// Broadcasts the `game_over` notice for the room, if its game is finished.
    pub async fn broadcast_game_over(&self, games: &GameManager, room_id: RoomId) -> usize {
        games
            .with_room(room_id, |game| self.broadcast_game_over_of(room_id, game))
            .await
            .unwrap_or_default()
    }

    /// Number of sockets registered in a room.
    pub fn connection_count(&self, room_id: RoomId) -> usize {
        self.read().get(&room_id).map_or(0, HashMap::len)
    }

    /// Number of rooms with at least one socket.
    pub fn room_count(&self) -> usize {
        self.read().len()
    }
}
