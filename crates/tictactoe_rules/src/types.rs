//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Side length of the board.
pub const BOARD_SIZE: i64 = 3;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Mark placed by a seat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Symbol {
    /// Symbol of the first seat (moves first).
    O,
    /// Symbol of the second seat.
    X,
}

/// A cell on the tic-tac-toe board.
///
/// On the wire a cell is a one-character string: `" "`, `"O"` or `"X"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a symbol.
    Occupied(Symbol),
}

impl Cell {
    /// Wire representation of this cell.
    pub fn as_str(self) -> &'static str {
        match self {
            Cell::Empty => " ",
            Cell::Occupied(Symbol::O) => "O",
            Cell::Occupied(Symbol::X) => "X",
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.as_str().to_string()
    }
}

impl TryFrom<String> for Cell {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            " " => Ok(Cell::Empty),
            "O" => Ok(Cell::Occupied(Symbol::O)),
            "X" => Ok(Cell::Occupied(Symbol::X)),
            other => Err(format!("invalid cell {:?}", other)),
        }
    }
}

/// 3x3 tic-tac-toe board.
///
/// Cells are stored row-major: `(x, y)` lives at index `x + y * 3`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Returns true if `(x, y)` lies on the board.
    pub fn in_bounds(x: i64, y: i64) -> bool {
        (0..BOARD_SIZE).contains(&x) && (0..BOARD_SIZE).contains(&y)
    }

    /// Places `symbol` at `(x, y)`.
    ///
    /// Returns false, leaving the board untouched, when the coordinates are
    /// off the board or the target cell is taken.
    #[instrument(skip(self))]
    pub fn make_move(&mut self, symbol: Symbol, x: i64, y: i64) -> bool {
        if !Self::in_bounds(x, y) {
            debug!("Coordinates out of bounds");
            return false;
        }
        let index = (x + y * BOARD_SIZE) as usize;
        if self.cells[index] != Cell::Empty {
            debug!(index, "Cell already occupied");
            return false;
        }
        self.cells[index] = Cell::Occupied(symbol);
        true
    }

    /// Gets the cell at the given flat index (0-8).
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Checks if no empty cell remains.
    pub fn is_full(&self) -> bool {
        crate::rules::is_full(self)
    }

    /// Resets every cell to empty.
    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; CELL_COUNT];
    }
}
