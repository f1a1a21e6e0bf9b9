//! Pure game logic for two-player 4x4 tic-tac-toe.
//!
//! # Architecture
//!
//! - **Board**: fixed 16-cell grid with value-checked placement
//! - **Rules**: pure win/draw/legality evaluation over a board
//! - **Session**: the phase state machine (coin flip → play → win/draw →
//!   clear/restart) driven by the four operations `join`, `coin_flip`,
//!   `play`, and `reset`, plus read-only snapshots for polling clients
//!
//! The crate holds no transport concerns; a serving component owns a
//! [`GameSession`] and serializes mutating access to it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod rules;
mod session;

pub use board::{Board, Cell, Mark, BOARD_CELLS, BOARD_SIDE};
pub use error::{MoveError, SessionError};
pub use rules::{check_winner, is_draw, is_full, is_legal_move, Win, WIN_LINES};
pub use session::{
    ButtonState, GameSession, MoveReport, Outcome, Phase, SessionSnapshot, MAX_PLAYERS,
};
