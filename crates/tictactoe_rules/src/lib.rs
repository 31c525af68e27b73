//! Pure tic-tac-toe rules for room-based online play.
//!
//! This crate knows nothing about sockets or rooms. It provides:
//!
//! - [`Board`]: the 3x3 grid with move legality and fullness checks
//! - [`rules`]: win detection over the eight fixed lines and the fullness check
//! - [`Game`]: the two-seat state machine (waiting, in game, finished)
//!   including reconnection and reset between rounds
//!
//! # Example
//!
//! ```
//! use tictactoe_rules::{Game, GameStatus, MoveOutcome};
//!
//! let mut game = Game::new("alice");
//! game.admit("bob").unwrap();
//! assert_eq!(game.status(), GameStatus::InGame);
//!
//! let outcome = game.make_move("alice", 1, 1).unwrap();
//! assert!(matches!(outcome, MoveOutcome::Continues { .. }));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod game;
mod player;
pub mod rules;
mod types;

/// Identifier of a room; each room holds exactly one game.
pub type RoomId = i64;

pub use error::{JoinError, MoveError};
pub use game::{Game, GameSnapshot, GameStatus, MoveOutcome, Outcome};
pub use player::{Player, Seat};
pub use types::{BOARD_SIZE, Board, CELL_COUNT, Cell, Symbol};
