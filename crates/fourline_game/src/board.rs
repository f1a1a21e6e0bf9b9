//! Core board types for 4x4 tic-tac-toe.

use crate::error::MoveError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of cells on the board (4x4, row-major).
pub const BOARD_CELLS: usize = 16;

/// Board side length.
pub const BOARD_SIDE: usize = 4;

/// The mark a player places on the board.
///
/// Player 0 plays `O`, player 1 plays `X`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Mark {
    /// Player 0's mark.
    O,
    /// Player 1's mark.
    X,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::O => Mark::X,
            Mark::X => Mark::O,
        }
    }

    /// Returns the player index that owns this mark (O is 0, X is 1).
    pub fn player_index(self) -> usize {
        match self {
            Mark::O => 0,
            Mark::X => 1,
        }
    }

    /// Returns the mark for a player index, if the index is 0 or 1.
    pub fn from_player_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Mark::O),
            1 => Some(Mark::X),
            _ => None,
        }
    }
}

/// A single cell on the board.
///
/// Serialized as `""`, `"O"`, or `"X"` so the board travels over the wire
/// as an ordered sequence of 16 strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the wire representation of this cell.
    pub fn as_str(self) -> &'static str {
        match self {
            Cell::Empty => "",
            Cell::Occupied(Mark::O) => "O",
            Cell::Occupied(Mark::X) => "X",
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl Visitor<'_> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("one of \"\", \"O\", \"X\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Cell, E> {
                match value {
                    "" => Ok(Cell::Empty),
                    "O" => Ok(Cell::Occupied(Mark::O)),
                    "X" => Ok(Cell::Occupied(Mark::X)),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_str(CellVisitor)
    }
}

/// 4x4 tic-tac-toe board, cells in row-major order (0-15).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_CELLS],
        }
    }

    /// Gets the cell at the given position (0-15).
    pub fn get(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// Checks if the cell at the given position is empty.
    ///
    /// Out-of-range positions are not empty.
    pub fn is_cell_empty(&self, pos: usize) -> bool {
        matches!(self.get(pos), Some(Cell::Empty))
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Places a mark at the given position.
    ///
    /// Validation precedes mutation: a failed placement leaves the board
    /// untouched, and a non-empty cell can never be overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfRange`] if `pos` is not in `0..16`, or
    /// [`MoveError::Occupied`] if the cell already holds a mark.
    pub fn place(&mut self, pos: usize, mark: Mark) -> Result<(), MoveError> {
        match self.get(pos) {
            None => Err(MoveError::OutOfRange { position: pos }),
            Some(Cell::Occupied(_)) => Err(MoveError::Occupied { position: pos }),
            Some(Cell::Empty) => {
                self.cells[pos] = Cell::Occupied(mark);
                Ok(())
            }
        }
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.cells
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..BOARD_SIDE {
            for col in 0..BOARD_SIDE {
                let pos = row * BOARD_SIDE + col;
                match self.cells[pos] {
                    Cell::Empty => result.push('.'),
                    Cell::Occupied(Mark::O) => result.push('O'),
                    Cell::Occupied(Mark::X) => result.push('X'),
                }
                if col < BOARD_SIDE - 1 {
                    result.push('|');
                }
            }
            if row < BOARD_SIDE - 1 {
                result.push_str("\n-+-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
