//! Seats and the players sitting in them.

use crate::Symbol;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One of the two fixed player slots in a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Seat {
    /// First joiner, plays `O` and moves first.
    First,
    /// Second joiner, plays `X`.
    Second,
}

impl Seat {
    /// Positional index of the seat (0 or 1).
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    /// Symbol permanently bound to the seat.
    pub fn symbol(self) -> Symbol {
        match self {
            Seat::First => Symbol::O,
            Seat::Second => Symbol::X,
        }
    }

    /// Returns the opposite seat.
    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// A player seated in a room.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Player {
    /// Display name, unique within the room.
    name: String,
    /// Symbol assigned on first join; never reassigned.
    symbol: Symbol,
    /// Whether a live connection currently holds this seat.
    connected: bool,
}

impl Player {
    /// Seats a freshly connected player.
    pub fn new(name: impl Into<String>, seat: Seat) -> Self {
        Self {
            name: name.into(),
            symbol: seat.symbol(),
            connected: true,
        }
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}
