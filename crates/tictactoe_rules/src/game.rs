//! Two-player game state machine layered on [`Board`].
//!
//! A game moves through three phases:
//!
//! - [`GameStatus::Waiting`]: fewer than two connected players
//! - [`GameStatus::InGame`]: both seats connected, moves accepted
//! - [`GameStatus::Finished`]: terminal until [`Game::reset`]
//!
//! Seating is explicit: [`Game::occupy_seat`] takes the free second seat and
//! [`Game::reoccupy_seat`] hands a disconnected seat back to its owner.
//! [`Game::admit`] picks between them.

use crate::rules;
use crate::{Board, Cell, JoinError, MoveError, Player, Seat, CELL_COUNT};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Lifecycle phase of a game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Fewer than two connected players.
    Waiting,
    /// Both seats connected; moves are accepted.
    InGame,
    /// The game ended; no further moves.
    Finished,
}

/// Result of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The named player completed a line.
    Winner(String),
    /// The board filled up without a line.
    Draw,
}

impl Outcome {
    /// Wire label: the winner's name, or `"draw"`.
    pub fn label(&self) -> &str {
        match self {
            Outcome::Winner(name) => name,
            Outcome::Draw => "draw",
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What an accepted move did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Play continues; the turn passed to `next`.
    Continues {
        /// Seat now on move.
        next: Seat,
    },
    /// The move ended the game.
    Finished(Outcome),
}

/// Serializable view of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Cells in row-major order.
    pub board: [Cell; CELL_COUNT],
    /// Name of the player on move, or `""` if that seat is empty.
    pub current_player: String,
    /// Lifecycle phase.
    pub state: GameStatus,
    /// `""`, the winner's name, or `"draw"`.
    pub winner: String,
}

/// A single room's game: two seats, a board and whose turn it is.
#[derive(Debug, Clone)]
pub struct Game {
    host: Player,
    guest: Option<Player>,
    current: Seat,
    status: GameStatus,
    outcome: Option<Outcome>,
    board: Board,
}

impl Game {
    /// Creates a game with `host_name` in the first seat, waiting for an opponent.
    #[instrument]
    pub fn new(host_name: &str) -> Self {
        debug!("Creating game");
        Self {
            host: Player::new(host_name, Seat::First),
            guest: None,
            current: Seat::First,
            status: GameStatus::Waiting,
            outcome: None,
            board: Board::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the lifecycle phase.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the result, set only once the game is finished.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Returns the seat on move.
    pub fn current_seat(&self) -> Seat {
        self.current
    }

    /// Returns the index (0 or 1) of the seat on move.
    pub fn current_player_index(&self) -> usize {
        self.current.index()
    }

    /// Returns the player on move, if that seat is occupied.
    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.current)
    }

    /// Returns the player in `seat`, if occupied.
    pub fn player(&self, seat: Seat) -> Option<&Player> {
        match seat {
            Seat::First => Some(&self.host),
            Seat::Second => self.guest.as_ref(),
        }
    }

    fn player_mut(&mut self, seat: Seat) -> Option<&mut Player> {
        match seat {
            Seat::First => Some(&mut self.host),
            Seat::Second => self.guest.as_mut(),
        }
    }

    /// Iterates over occupied seats.
    pub fn players(&self) -> impl Iterator<Item = (Seat, &Player)> {
        Seat::iter().filter_map(|seat| self.player(seat).map(|p| (seat, p)))
    }

    /// Finds the seat held by `name`.
    pub fn seat_of(&self, name: &str) -> Option<Seat> {
        self.players()
            .find(|(_, p)| p.name() == name)
            .map(|(seat, _)| seat)
    }

    /// True when both seats are occupied and connected.
    pub fn both_seats_connected(&self) -> bool {
        Seat::iter().all(|seat| self.player(seat).is_some_and(|p| *p.connected()))
    }

    /// True when every occupied seat is disconnected.
    pub fn is_abandoned(&self) -> bool {
        self.players().all(|(_, p)| !*p.connected())
    }

    /// Seats `name`, reconnecting a known player or taking the free second seat.
    #[instrument(skip(self))]
    pub fn admit(&mut self, name: &str) -> Result<Seat, JoinError> {
        match self.seat_of(name) {
            Some(seat) => self.reoccupy_seat(seat).map(|()| seat),
            None => self.occupy_seat(name),
        }
    }

    /// Puts a new player in the second seat.
    #[instrument(skip(self))]
    pub fn occupy_seat(&mut self, name: &str) -> Result<Seat, JoinError> {
        if self.seat_of(name).is_some() {
            return Err(JoinError::AlreadyConnected);
        }
        if self.guest.is_some() {
            return Err(JoinError::LobbyFull);
        }
        self.guest = Some(Player::new(name, Seat::Second));
        self.refresh_status();
        info!(status = %self.status, "Second seat occupied");
        Ok(Seat::Second)
    }

    /// Hands a disconnected seat back to its owner.
    ///
    /// The seat keeps its name and symbol.
    #[instrument(skip(self))]
    pub fn reoccupy_seat(&mut self, seat: Seat) -> Result<(), JoinError> {
        let player = self.player_mut(seat).ok_or(JoinError::SeatEmpty)?;
        if *player.connected() {
            return Err(JoinError::AlreadyConnected);
        }
        player.set_connected(true);
        self.refresh_status();
        info!(status = %self.status, "Seat reoccupied");
        Ok(())
    }

    /// Marks the seat held by `name` as disconnected.
    ///
    /// Returns false if no seat carries that name.
    #[instrument(skip(self))]
    pub fn vacate_seat(&mut self, name: &str) -> bool {
        let Some(seat) = self.seat_of(name) else {
            return false;
        };
        if let Some(player) = self.player_mut(seat) {
            player.set_connected(false);
        }
        self.refresh_status();
        info!(?seat, status = %self.status, "Seat vacated");
        true
    }

    /// Places the current player's symbol at `(x, y)`.
    ///
    /// Accepted only while [`GameStatus::InGame`] and only from the player on move.
    #[instrument(skip(self))]
    pub fn make_move(
        &mut self,
        player_name: &str,
        x: i64,
        y: i64,
    ) -> Result<MoveOutcome, MoveError> {
        if self.status != GameStatus::InGame {
            return Err(MoveError::NotInGame);
        }
        if self.current_player().map(|p| p.name().as_str()) != Some(player_name) {
            return Err(MoveError::NotYourTurn(player_name.to_string()));
        }
        if !Board::in_bounds(x, y) {
            return Err(MoveError::OutOfBounds(x, y));
        }
        if !self.board.make_move(self.current.symbol(), x, y) {
            return Err(MoveError::CellOccupied(x, y));
        }
        Ok(self.update_game_state())
    }

    /// Evaluates the board after the current seat moved.
    ///
    /// The turn passes only when the move did not end the game.
    fn update_game_state(&mut self) -> MoveOutcome {
        let mover = self.current;
        let outcome = if rules::has_won(&self.board, mover.symbol()) {
            let name = self.player(mover).map(|p| p.name().clone()).unwrap_or_default();
            Some(Outcome::Winner(name))
        } else if self.board.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                info!(%outcome, "Game finished");
                self.status = GameStatus::Finished;
                self.outcome = Some(outcome.clone());
                MoveOutcome::Finished(outcome)
            }
            None => {
                self.current = mover.other();
                MoveOutcome::Continues { next: self.current }
            }
        }
    }

    /// Clears the board and result so the room can play another round.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.clear();
        self.outcome = None;
        self.current = Seat::First;
        self.status = if self.both_seats_connected() {
            GameStatus::InGame
        } else {
            GameStatus::Waiting
        };
        debug!(status = %self.status, "Game reset");
    }

    /// Recomputes the phase from seat connectivity; a finished game stays finished.
    fn refresh_status(&mut self) {
        if self.status == GameStatus::Finished {
            return;
        }
        self.status = if self.both_seats_connected() {
            GameStatus::InGame
        } else {
            GameStatus::Waiting
        };
    }

    /// Returns the serializable view of this game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: *self.board.cells(),
            current_player: self
                .current_player()
                .map(|p| p.name().clone())
                .unwrap_or_default(),
            state: self.status,
            winner: self
                .outcome
                .as_ref()
                .map(|o| o.label().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    fn started() -> Game {
        let mut game = Game::new("alice");
        game.admit("bob").expect("second seat free");
        game
    }

    #[test]
    fn test_new_game_waits_for_opponent() {
        let game = Game::new("alice");
        assert_eq!(game.status(), GameStatus::Waiting);
        assert_eq!(game.current_player().map(|p| p.name().as_str()), Some("alice"));
        assert_eq!(*game.player(Seat::First).unwrap().symbol(), Symbol::O);
        assert!(game.player(Seat::Second).is_none());
    }

    #[test]
    fn test_second_player_starts_game() {
        let game = started();
        assert_eq!(game.status(), GameStatus::InGame);
        assert_eq!(*game.player(Seat::Second).unwrap().symbol(), Symbol::X);
        assert_eq!(game.current_player_index(), 0);
    }

    #[test]
    fn test_third_player_rejected() {
        let mut game = started();
        assert_eq!(game.admit("carol"), Err(JoinError::LobbyFull));
        assert!(game.seat_of("carol").is_none());
    }

    #[test]
    fn test_duplicate_connected_name_rejected() {
        let mut game = started();
        assert_eq!(game.admit("alice"), Err(JoinError::AlreadyConnected));
        assert_eq!(game.admit("bob"), Err(JoinError::AlreadyConnected));
    }

    #[test]
    fn test_turn_follows_move_count() {
        let mut game = started();
        let moves = [(0, 0), (1, 1), (2, 2), (0, 1), (2, 1)];
        for (count, &(x, y)) in moves.iter().enumerate() {
            assert_eq!(game.current_player_index(), count % 2);
            let mover = game.current_player().unwrap().name().clone();
            assert!(matches!(
                game.make_move(&mover, x, y),
                Ok(MoveOutcome::Continues { .. })
            ));
        }
        assert_eq!(game.current_player_index(), moves.len() % 2);
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let mut game = started();
        assert_eq!(
            game.make_move("bob", 0, 0),
            Err(MoveError::NotYourTurn("bob".to_string()))
        );
        assert_eq!(game.make_move("mallory", 0, 0), Err(MoveError::NotYourTurn("mallory".to_string())));
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn test_illegal_cells_rejected() {
        let mut game = started();
        game.make_move("alice", 0, 0).unwrap();
        assert_eq!(game.make_move("bob", 0, 0), Err(MoveError::CellOccupied(0, 0)));
        assert_eq!(game.make_move("bob", 3, 0), Err(MoveError::OutOfBounds(3, 0)));
        assert_eq!(game.current_seat(), Seat::Second);
    }

    #[test]
    fn test_win_finishes_without_advancing_turn() {
        let mut game = started();
        for (name, x, y) in [("alice", 0, 0), ("bob", 1, 1), ("alice", 1, 0), ("bob", 2, 2)] {
            game.make_move(name, x, y).unwrap();
        }
        let outcome = game.make_move("alice", 2, 0).unwrap();
        assert_eq!(outcome, MoveOutcome::Finished(Outcome::Winner("alice".into())));
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(game.current_seat(), Seat::First);
        assert_eq!(game.snapshot().winner, "alice");
        assert_eq!(game.make_move("bob", 2, 1), Err(MoveError::NotInGame));
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut game = started();
        // O X O / O X X / X O O
        let moves = [
            ("alice", 0, 0),
            ("bob", 1, 0),
            ("alice", 2, 0),
            ("bob", 1, 1),
            ("alice", 0, 1),
            ("bob", 2, 1),
            ("alice", 1, 2),
            ("bob", 0, 2),
        ];
        for (name, x, y) in moves {
            assert!(matches!(game.make_move(name, x, y), Ok(MoveOutcome::Continues { .. })));
        }
        assert_eq!(game.make_move("alice", 2, 2), Ok(MoveOutcome::Finished(Outcome::Draw)));
        assert_eq!(game.snapshot().winner, "draw");
        assert!(game.outcome().unwrap().is_draw());
    }

    #[test]
    fn test_reset_after_finish() {
        let mut game = started();
        for (name, x, y) in [("alice", 0, 0), ("bob", 0, 1), ("alice", 1, 0), ("bob", 1, 1), ("alice", 2, 0)] {
            game.make_move(name, x, y).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Finished);
        game.reset();
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.current_player_index(), 0);
        assert_eq!(game.status(), GameStatus::InGame);
        assert!(game.outcome().is_none());
    }

    #[test]
    fn test_reset_with_absent_player_waits() {
        let mut game = started();
        game.vacate_seat("bob");
        game.reset();
        assert_eq!(game.status(), GameStatus::Waiting);
    }

    #[test]
    fn test_disconnect_and_reconnect_keeps_seat() {
        let mut game = started();
        game.make_move("alice", 0, 0).unwrap();
        assert!(game.vacate_seat("alice"));
        assert_eq!(game.status(), GameStatus::Waiting);
        assert_eq!(game.make_move("bob", 1, 1), Err(MoveError::NotInGame));

        assert_eq!(game.admit("alice"), Ok(Seat::First));
        assert_eq!(game.status(), GameStatus::InGame);
        assert_eq!(*game.player(Seat::First).unwrap().symbol(), Symbol::O);
        assert_eq!(game.board().get(0), Some(Cell::Occupied(Symbol::O)));
        assert_eq!(game.current_seat(), Seat::Second);
    }

    #[test]
    fn test_reconnect_alone_stays_waiting() {
        let mut game = started();
        game.vacate_seat("alice");
        game.vacate_seat("bob");
        assert!(game.is_abandoned());
        game.admit("bob").unwrap();
        assert_eq!(game.status(), GameStatus::Waiting);
        assert!(!game.is_abandoned());
    }

    #[test]
    fn test_reoccupy_empty_seat() {
        let mut game = Game::new("alice");
        assert_eq!(game.reoccupy_seat(Seat::Second), Err(JoinError::SeatEmpty));
    }

    #[test]
    fn test_vacate_unknown_name() {
        let mut game = started();
        assert!(!game.vacate_seat("carol"));
        assert_eq!(game.status(), GameStatus::InGame);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut game = started();
        game.make_move("alice", 0, 0).unwrap();
        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "board": ["O", " ", " ", " ", " ", " ", " ", " ", " "],
                "current_player": "bob",
                "state": "in_game",
                "winner": "",
            })
        );
    }
}
