//! Game rules for 4x4 tic-tac-toe.
//!
//! Pure functions for evaluating game state, separated from board storage
//! and from the session state machine that drives them.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{check_winner, is_legal_move, Win, WIN_LINES};
