//! Room registry: one game per room id.

use std::collections::HashMap;
use std::sync::Arc;
use tictactoe_rules::{Game, GameSnapshot, JoinError, MoveError, MoveOutcome, RoomId, Seat};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

type Room = Arc<Mutex<Game>>;

/// Owns every room's [`Game`] and enforces join, reconnect and capacity rules.
///
/// Joins and disconnects hold the registry write lock because they may create
/// or delete a room. Everything else takes the registry lock only long enough
/// to find the room, then works under that room's own mutex, so rooms never
/// contend with each other.
#[derive(Debug, Clone, Default)]
pub struct GameManager {
    rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
}

impl GameManager {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating game manager");
        Self::default()
    }

    /// Admits `player_name` into `room_id`, creating the room on first join.
    ///
    /// A known name whose seat is disconnected gets that seat back. A new name
    /// takes the second seat if it is free.
    #[instrument(skip(self))]
    pub async fn connect_to_game(
        &self,
        room_id: RoomId,
        player_name: &str,
    ) -> Result<Seat, JoinError> {
        let mut rooms = self.rooms.write().await;

        let Some(room) = rooms.get(&room_id) else {
            rooms.insert(room_id, Arc::new(Mutex::new(Game::new(player_name))));
            info!("Room created");
            return Ok(Seat::First);
        };

        let mut game = room.lock().await;
        match game.admit(player_name) {
            Ok(seat) => {
                info!(?seat, status = %game.status(), "Player admitted");
                Ok(seat)
            }
            Err(e) => {
                warn!(error = %e, "Join rejected");
                Err(e)
            }
        }
    }

    /// Marks the player's seat disconnected, deleting the room once every seat is empty.
    ///
    /// Returns true while the room still exists afterwards.
    #[instrument(skip(self))]
    pub async fn disconnect_from_game(&self, room_id: RoomId, player_name: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(&room_id).cloned() else {
            debug!("Room already gone");
            return false;
        };

        let abandoned = {
            let mut game = room.lock().await;
            if !game.vacate_seat(player_name) {
                debug!("Player not seated in room");
            }
            game.is_abandoned()
        };

        if abandoned {
            rooms.remove(&room_id);
            info!("Room deleted");
        }
        !abandoned
    }

    /// Returns the room's snapshot, or `None` if the room does not exist.
    #[instrument(skip(self))]
    pub async fn get_game_state(&self, room_id: RoomId) -> Option<GameSnapshot> {
        self.with_room(room_id, |game| game.snapshot()).await
    }

    /// Applies a move on behalf of `player_name`.
    #[instrument(skip(self))]
    pub async fn make_move(
        &self,
        room_id: RoomId,
        player_name: &str,
        x: i64,
        y: i64,
    ) -> Result<MoveOutcome, MoveError> {
        self.with_room(room_id, |game| game.make_move(player_name, x, y))
            .await
            .ok_or(MoveError::RoomNotFound(room_id))?
    }

    /// Resets a room's game for another round.
    #[instrument(skip(self))]
    pub async fn reset_game(&self, room_id: RoomId) -> bool {
        self.with_room(room_id, Game::reset).await.is_some()
    }

    /// Runs `f` on the room's game while holding that room's lock.
    ///
    /// Whatever `f` does, including broadcasting, is observed by other
    /// sessions of the room as one step.
    pub async fn with_room<R>(&self, room_id: RoomId, f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        let room = self.rooms.read().await.get(&room_id).cloned()?;
        let mut game = room.lock().await;
        Some(f(&mut game))
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
