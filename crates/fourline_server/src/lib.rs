//! HTTP game server for two-player 4x4 tic-tac-toe.
//!
//! Serves the five-operation polling API (`join`, `coinflip`, `load`,
//! `move`, `reset`/`clear`) over one server-authoritative
//! [`GameSession`](fourline_game::GameSession).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;

pub use api::{
    app, shared_session, AckResponse, CoinFlipResponse, JoinResponse, MoveRequest, MoveResponse,
    SharedSession, WinResult,
};
