//! Fullness check for tic-tac-toe; a full board without a line is a draw.

use crate::{Board, Cell};
use tracing::instrument;

/// Checks if the board is full (no empty cell remains).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| *c != Cell::Empty)
}
