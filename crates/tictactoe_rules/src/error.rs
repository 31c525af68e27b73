//! Errors produced by the game state machine.

use crate::RoomId;
use derive_more::{Display, Error};

/// Why a player could not take a seat.
///
/// The display text is sent verbatim to the rejected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum JoinError {
    /// A connected seat already carries this name.
    #[display("player already connected")]
    AlreadyConnected,
    /// Both seats are taken by other names.
    #[display("lobby full")]
    LobbyFull,
    /// Reconnection targeted a seat nobody ever took.
    #[display("seat is empty")]
    SeatEmpty,
}

/// Why a move had no effect.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveError {
    /// No room with the given id exists.
    #[display("Room {} not found", _0)]
    RoomNotFound(RoomId),

    /// The game is waiting for players or already over.
    #[display("Game is not in progress")]
    NotInGame,

    /// The mover is not the current player.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(String),

    /// Coordinates lie off the board.
    #[display("Coordinates ({}, {}) are off the board", _0, _1)]
    OutOfBounds(i64, i64),

    /// The target cell is taken.
    #[display("Cell ({}, {}) is already occupied", _0, _1)]
    CellOccupied(i64, i64),
}

impl std::error::Error for MoveError {}
