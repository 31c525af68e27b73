//! Win detection logic for tic-tac-toe.

use crate::{Board, Cell, Symbol};
use tracing::instrument;

/// The eight winning triples over the flattened board: rows, columns, diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks whether `symbol` occupies a complete winning line.
#[instrument(skip(board))]
pub fn has_won(board: &Board, symbol: Symbol) -> bool {
    WINNING_LINES.iter().any(|line| {
        line.iter()
            .all(|&i| board.get(i) == Some(Cell::Occupied(symbol)))
    })
}
