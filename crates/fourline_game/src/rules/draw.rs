//! Draw detection for 4x4 tic-tac-toe.

use super::win::check_winner;
use crate::board::Board;
use tracing::instrument;

/// Checks if the board is full (every cell occupied).
#[instrument]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// Checks if the game is a draw: full board with no winner.
///
/// A full board that contains a winning line is a win, not a draw.
#[instrument]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && check_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Mark;

    /// Fills the board in a checkered pattern with no winning line:
    /// ```text
    /// O O X X
    /// X X O O
    /// O O X X
    /// X X O O
    /// ```
    fn drawn_board() -> Board {
        let mut board = Board::new();
        for (pos, mark) in [
            (0, Mark::O), (1, Mark::O), (2, Mark::X), (3, Mark::X),
            (4, Mark::X), (5, Mark::X), (6, Mark::O), (7, Mark::O),
            (8, Mark::O), (9, Mark::O), (10, Mark::X), (11, Mark::X),
            (12, Mark::X), (13, Mark::X), (14, Mark::O), (15, Mark::O),
        ] {
            board.place(pos, mark).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.place(5, Mark::X).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board_without_winner_is_draw() {
        let board = drawn_board();
        assert!(is_full(&board));
        assert!(is_draw(&board));
    }

    #[test]
    fn test_full_board_with_winner_is_not_draw() {
        // Fill the whole board but give O the top row.
        let mut board = Board::new();
        for pos in [0, 1, 2, 3, 6, 7, 8, 9] {
            board.place(pos, Mark::O).unwrap();
        }
        for pos in [4, 5, 10, 11, 12, 13, 14, 15] {
            board.place(pos, Mark::X).unwrap();
        }
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }
}
