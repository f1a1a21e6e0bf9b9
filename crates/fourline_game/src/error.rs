//! Error types for moves and session operations.

use derive_more::{Display, Error, From};

/// A rejected board placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Position is outside the 4x4 board.
    #[display("Position {position} is out of range (expected 0-15)")]
    OutOfRange {
        /// The offending position.
        position: usize,
    },
    /// Cell is already occupied.
    #[display("Position {position} is already occupied")]
    Occupied {
        /// The offending position.
        position: usize,
    },
}

/// A rejected session operation.
///
/// All variants are request-local and non-fatal: validation precedes
/// mutation, so a failed operation never changes shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// Both player slots are taken.
    #[display("Game is full")]
    GameFull,
    /// The single-use coin flip has already been spent.
    #[display("Coin flip already done")]
    AlreadyFlipped,
    /// Wrong player, or the phase does not admit moves.
    #[display("Not your turn")]
    NotYourTurn,
    /// The board rejected the placement.
    #[display("Invalid move: {_0}")]
    InvalidMove(MoveError),
    /// Reset is only available once a starting player exists and no game
    /// is in progress.
    #[display("Reset is not available right now")]
    ResetUnavailable,
}
