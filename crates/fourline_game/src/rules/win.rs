//! Win detection and move legality for 4x4 tic-tac-toe.

use crate::board::{Board, Cell, Mark};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The ten winning lines: 4 rows, 4 columns, 2 diagonals.
///
/// Enumeration order is fixed; the first fully occupied line wins.
pub const WIN_LINES: [[usize; 4]; 10] = [
    // Rows
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    // Columns
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    // Diagonals
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

/// A detected win: the winning mark and the line that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Win {
    /// The winning mark.
    mark: Mark,
    /// Positions of the winning line.
    line: [usize; 4],
}

/// Checks if there is a winner on the board.
///
/// Returns the winning mark and line if all four cells of one of the
/// [`WIN_LINES`] hold the same mark, `None` otherwise. Under valid play
/// at most one mark can complete a line, so the first match suffices.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Win> {
    for line in WIN_LINES {
        let [a, b, c, d] = line;
        let cell = board.get(a);
        if let Some(Cell::Occupied(mark)) = cell {
            if cell == board.get(b) && cell == board.get(c) && cell == board.get(d) {
                return Some(Win { mark, line });
            }
        }
    }
    None
}

/// Checks if a move is legal: position in range and the cell empty.
#[instrument]
pub fn is_legal_move(board: &Board, position: usize) -> bool {
    board.is_cell_empty(position)
}
