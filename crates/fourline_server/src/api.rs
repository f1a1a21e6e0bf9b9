//! HTTP API over a shared game session.
//!
//! The wire contract matches the original polling client: five `/api`
//! routes, JSON payloads with a `success` flag, and HTTP 400 for every
//! rejected operation.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use fourline_game::{GameSession, Mark, SessionError, SessionSnapshot, Win};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Shared server state: the single game session behind one mutex.
///
/// Every mutating operation locks the session for its whole handler, and
/// handlers never await while holding the lock, so the turn invariant
/// holds under concurrent requests.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Creates the shared session for a new server.
pub fn shared_session() -> SharedSession {
    Arc::new(Mutex::new(GameSession::new()))
}

/// Builds the API router over the given session.
pub fn app(session: SharedSession) -> Router {
    Router::new()
        .route("/api/join", post(join))
        .route("/api/coinflip", post(coin_flip))
        .route("/api/load", get(load))
        .route("/api/move", post(make_move))
        .route("/api/reset", post(reset))
        .route("/api/clear", post(clear))
        .with_state(session)
}

/// A rejected request: HTTP 400 with `{"success": false, "message": ...}`.
struct ApiError(SessionError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "message": self.0.to_string(),
        }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

/// Response to a successful join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Index assigned to the new player (0 or 1).
    #[serde(rename = "playerNumber")]
    pub player_number: usize,
    /// Human-readable confirmation.
    pub message: String,
}

/// Response to a successful coin flip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinFlipResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Index of the player who goes first.
    #[serde(rename = "firstPlayer")]
    pub first_player: usize,
    /// Human-readable confirmation.
    pub message: String,
}

/// Request body for a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Board position (0-15).
    pub position: usize,
    /// Index of the acting player.
    pub player: usize,
}

/// Win detail attached to a move response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinResult {
    /// True if the move completed a line.
    pub win: bool,
    /// The winning mark, if any.
    pub winner: Option<Mark>,
    /// Positions of the winning line, empty if no win.
    #[serde(rename = "winningPositions")]
    pub winning_positions: Vec<usize>,
    /// True if the move ended the game in a draw.
    pub draw: bool,
}

impl WinResult {
    fn new(win: Option<Win>, draw: bool) -> Self {
        match win {
            Some(win) => Self {
                win: true,
                winner: Some(*win.mark()),
                winning_positions: win.line().to_vec(),
                draw,
            },
            None => Self {
                win: false,
                winner: None,
                winning_positions: Vec::new(),
                draw,
            },
        }
    }
}

/// Response to a successful move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Session snapshot after the move.
    #[serde(rename = "gameState")]
    pub game_state: SessionSnapshot,
    /// Win/draw detail for the move.
    #[serde(rename = "winResult")]
    pub win_result: WinResult,
}

/// Response to a successful reset or clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

#[instrument(skip(session))]
async fn join(State(session): State<SharedSession>) -> Result<Json<JoinResponse>, ApiError> {
    let mut session = session.lock().expect("session mutex poisoned");
    let player_number = session.join()?;
    let mark = Mark::from_player_index(player_number).unwrap_or(Mark::O);
    info!(player_number, %mark, "Player joined the game");
    Ok(Json(JoinResponse {
        success: true,
        player_number,
        message: format!("Joined as player {mark}"),
    }))
}

#[instrument(skip(session))]
async fn coin_flip(
    State(session): State<SharedSession>,
) -> Result<Json<CoinFlipResponse>, ApiError> {
    let mut session = session.lock().expect("session mutex poisoned");
    let first_player = session.coin_flip()?;
    let mark = Mark::from_player_index(first_player).unwrap_or(Mark::O);
    info!(first_player, %mark, "Coin flip done");
    Ok(Json(CoinFlipResponse {
        success: true,
        first_player,
        message: format!("Coin flip result: {mark} goes first!"),
    }))
}

#[instrument(skip(session))]
async fn load(State(session): State<SharedSession>) -> Json<SessionSnapshot> {
    let session = session.lock().expect("session mutex poisoned");
    debug!("Serving session snapshot");
    Json(session.snapshot())
}

#[instrument(skip(session), fields(position = req.position, player = req.player))]
async fn make_move(
    State(session): State<SharedSession>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let mut session = session.lock().expect("session mutex poisoned");
    let report = session.play(req.player, req.position).inspect_err(|err| {
        warn!(player = req.player, position = req.position, %err, "Move rejected");
    })?;
    info!(
        player = req.player,
        position = req.position,
        win = report.win().is_some(),
        draw = report.draw(),
        "Move committed"
    );
    Ok(Json(MoveResponse {
        success: true,
        game_state: session.snapshot(),
        win_result: WinResult::new(report.win(), report.draw()),
    }))
}

#[instrument(skip(session))]
async fn reset(State(session): State<SharedSession>) -> Result<Json<AckResponse>, ApiError> {
    let mut session = session.lock().expect("session mutex poisoned");
    session.reset()?;
    info!("Game reset");
    Ok(Json(AckResponse {
        success: true,
        message: "Game reset successfully".to_string(),
    }))
}

/// Functionally identical to [`reset`]; kept as its own route because the
/// client calls `/api/clear` after a draw and `/api/reset` after a win.
#[instrument(skip(session))]
async fn clear(State(session): State<SharedSession>) -> Result<Json<AckResponse>, ApiError> {
    let mut session = session.lock().expect("session mutex poisoned");
    session.reset()?;
    info!("Game cleared");
    Ok(Json(AckResponse {
        success: true,
        message: "Game cleared successfully".to_string(),
    }))
}
