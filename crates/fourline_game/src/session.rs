//! Game session state machine.
//!
//! One session holds the board, whose turn it is, and the phase of the
//! game lifecycle: coin flip → play → win/draw → clear/restart. The four
//! mutating operations (`join`, `coin_flip`, `play`, `reset`) validate
//! before they mutate, so a rejected operation never changes state.

use crate::board::{Board, Mark};
use crate::error::SessionError;
use crate::rules::{check_winner, is_full, Win};
use derive_getters::Getters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Number of player slots in a session.
pub const MAX_PLAYERS: usize = 2;

/// Stage of the game lifecycle.
///
/// Transitions are one-directional per game cycle:
/// `AwaitingCoinFlip` → `AwaitingStart` → `InProgress` → `Finished` →
/// (reset) → `AwaitingStart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// The coin flip has not happened yet.
    AwaitingCoinFlip,
    /// A starting player is chosen; the first move begins play.
    AwaitingStart,
    /// Game is ongoing.
    InProgress,
    /// Game ended with the given outcome.
    Finished(Outcome),
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A player completed a line.
    Winner(Mark),
    /// The board filled with no winner.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Winner(mark) => Some(*mark),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// Display hint for the client's three-state game button.
///
/// Derived from [`Phase`] at read time rather than stored, so it can
/// never drift out of sync with the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonState {
    /// Offer the coin flip.
    Flip,
    /// Offer to clear the board after a draw.
    Clear,
    /// Offer to start (or restart) a game.
    Start,
}

/// Detail of a committed move: the win it produced, if any, and whether
/// it filled the board into a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    win: Option<Win>,
    draw: bool,
}

impl MoveReport {
    /// Returns the win this move completed, if any.
    pub fn win(&self) -> Option<Win> {
        self.win
    }

    /// Returns true if this move ended the game in a draw.
    pub fn draw(&self) -> bool {
        self.draw
    }
}

/// Read-only snapshot of a session, in the polling clients' wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// True once the game has finished (win or draw).
    pub winner: bool,
    /// The board as 16 cells.
    pub board: Board,
    /// Index of the player whose turn it is.
    pub current_player: usize,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Derived display hint for the game button.
    pub button_state: ButtonState,
    /// Mark of whoever starts the current/next game, once chosen.
    pub starting_player: Option<Mark>,
    /// Mark of the most recent winner, if any game has been won.
    pub last_winner: Option<Mark>,
}

/// A single two-player game session.
///
/// Process-lifetime singleton in the server: created once at startup,
/// mutated by the four operations, never destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameSession {
    /// The board.
    board: Board,
    /// Index (0 or 1) of the player whose turn it is.
    current_player: usize,
    /// Lifecycle phase.
    phase: Phase,
    /// Mark of whoever starts the current/next game, once chosen.
    starting_mark: Option<Mark>,
    /// Mark of the most recent winner.
    last_winner: Option<Mark>,
    /// Number of joined players (0, 1, or 2).
    player_count: usize,
    /// Single-use coin flip guard.
    coin_flipped: bool,
}

impl GameSession {
    /// Creates a new session with an empty board, awaiting the coin flip.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating new game session");
        Self {
            board: Board::new(),
            current_player: 0,
            phase: Phase::AwaitingCoinFlip,
            starting_mark: None,
            last_winner: None,
            player_count: 0,
            coin_flipped: false,
        }
    }

    /// Joins the session, returning the new player's index (0 then 1).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::GameFull`] once both slots are taken.
    #[instrument(skip(self))]
    pub fn join(&mut self) -> Result<usize, SessionError> {
        if self.player_count >= MAX_PLAYERS {
            warn!(player_count = self.player_count, "Join rejected, game is full");
            return Err(SessionError::GameFull);
        }
        let index = self.player_count;
        self.player_count += 1;
        info!(player_index = index, mark = %Mark::from_player_index(index).unwrap_or(Mark::O), "Player joined");
        Ok(index)
    }

    /// Flips the coin to choose who goes first.
    ///
    /// Sets the current player and starting mark, moves the phase to
    /// [`Phase::AwaitingStart`], and spends the single-use guard.
    /// Returns the starting player's index.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyFlipped`] if the guard is spent.
    #[instrument(skip(self))]
    pub fn coin_flip(&mut self) -> Result<usize, SessionError> {
        self.coin_flip_with(&mut rand::thread_rng())
    }

    /// Flips the coin with a caller-supplied random source.
    #[instrument(skip(self, rng))]
    pub fn coin_flip_with<R: Rng>(&mut self, rng: &mut R) -> Result<usize, SessionError> {
        if self.coin_flipped {
            warn!("Coin flip rejected, already done");
            return Err(SessionError::AlreadyFlipped);
        }
        let first: usize = rng.gen_range(0..MAX_PLAYERS);
        let mark = Mark::from_player_index(first).unwrap_or(Mark::O);
        self.current_player = first;
        self.starting_mark = Some(mark);
        self.phase = Phase::AwaitingStart;
        self.coin_flipped = true;
        info!(first_player = first, mark = %mark, "Coin flip chose starting player");
        Ok(first)
    }

    /// Makes a move for the given player at the given position.
    ///
    /// The first legal move in [`Phase::AwaitingStart`] starts the game.
    /// A winning move finishes the game and makes the winner the starter
    /// of the next one; a board-filling move with no winner finishes it
    /// as a draw and leaves the starting mark unchanged; otherwise the
    /// turn passes to the other player.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotYourTurn`] if the phase does not admit
    /// moves or `player` is not the current player, and
    /// [`SessionError::InvalidMove`] for an out-of-range or occupied
    /// position.
    #[instrument(skip(self))]
    pub fn play(&mut self, player: usize, position: usize) -> Result<MoveReport, SessionError> {
        match self.phase {
            Phase::AwaitingStart | Phase::InProgress => {}
            _ => {
                warn!(player, position, phase = ?self.phase, "Move rejected, phase does not admit moves");
                return Err(SessionError::NotYourTurn);
            }
        }
        if player != self.current_player {
            warn!(
                player,
                current_player = self.current_player,
                "Move rejected, not this player's turn"
            );
            return Err(SessionError::NotYourTurn);
        }

        // current_player is always 0 or 1, so the lookup cannot fail here.
        let mark = Mark::from_player_index(player).ok_or(SessionError::NotYourTurn)?;
        self.board.place(position, mark)?;

        if let Some(win) = check_winner(&self.board) {
            let winner = *win.mark();
            self.phase = Phase::Finished(Outcome::Winner(winner));
            self.last_winner = Some(winner);
            // The winner starts the next game.
            self.starting_mark = Some(winner);
            info!(player, position, winner = %winner, line = ?win.line(), "Move won the game");
            return Ok(MoveReport {
                win: Some(win),
                draw: false,
            });
        }

        if is_full(&self.board) {
            self.phase = Phase::Finished(Outcome::Draw);
            info!(player, position, "Move filled the board, game drawn");
            return Ok(MoveReport {
                win: None,
                draw: true,
            });
        }

        self.phase = Phase::InProgress;
        self.current_player = (self.current_player + 1) % MAX_PLAYERS;
        debug!(
            player,
            position,
            next_player = self.current_player,
            "Move committed, turn passes"
        );
        Ok(MoveReport {
            win: None,
            draw: false,
        })
    }

    /// Resets the session for a new game (the Start/Clear button).
    ///
    /// Produces a fresh board with the current player derived from the
    /// starting mark (O starts as player 0, X as player 1), preserving
    /// the starting mark and last winner. The coin flip guard stays
    /// spent after a reset, so the coin is only ever flipped once per
    /// process.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ResetUnavailable`] before the coin flip
    /// (no starting mark to derive a turn from) or while a game is in
    /// progress.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Result<(), SessionError> {
        let starting_mark = match (self.phase, self.starting_mark) {
            (Phase::AwaitingStart | Phase::Finished(_), Some(mark)) => mark,
            _ => {
                warn!(phase = ?self.phase, "Reset rejected");
                return Err(SessionError::ResetUnavailable);
            }
        };
        self.board = Board::new();
        self.current_player = starting_mark.player_index();
        self.phase = Phase::AwaitingStart;
        self.coin_flipped = true;
        info!(starting_player = self.current_player, "Session reset for a new game");
        Ok(())
    }

    /// Returns the derived display hint for the client's game button.
    pub fn button_state(&self) -> ButtonState {
        match self.phase {
            Phase::AwaitingCoinFlip => ButtonState::Flip,
            Phase::Finished(Outcome::Draw) => ButtonState::Clear,
            _ => ButtonState::Start,
        }
    }

    /// Returns true once the game has finished (win or draw).
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    /// Takes a read-only snapshot for polling clients. No side effects.
    #[instrument(skip(self))]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            winner: self.is_finished(),
            board: self.board.clone(),
            current_player: self.current_player,
            phase: self.phase,
            button_state: self.button_state(),
            starting_player: self.starting_mark,
            last_winner: self.last_winner,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveError;

    /// Joins both players and flips the coin, returning the session and
    /// the starting player's index.
    fn flipped_session() -> (GameSession, usize) {
        let mut session = GameSession::new();
        session.join().unwrap();
        session.join().unwrap();
        let first = session.coin_flip().unwrap();
        (session, first)
    }

    #[test]
    fn test_new_session_awaits_coin_flip() {
        let session = GameSession::new();
        assert_eq!(*session.phase(), Phase::AwaitingCoinFlip);
        assert_eq!(session.button_state(), ButtonState::Flip);
        assert_eq!(*session.player_count(), 0);
        assert_eq!(*session.starting_mark(), None);
    }

    #[test]
    fn test_third_join_fails_with_game_full() {
        let mut session = GameSession::new();
        assert_eq!(session.join().unwrap(), 0);
        assert_eq!(session.join().unwrap(), 1);
        assert_eq!(session.join().unwrap_err(), SessionError::GameFull);
        assert_eq!(*session.player_count(), 2);
        // Joining never changes the phase.
        assert_eq!(*session.phase(), Phase::AwaitingCoinFlip);
    }

    #[test]
    fn test_coin_flip_transitions_to_awaiting_start() {
        let (session, first) = flipped_session();
        assert!(first < 2);
        assert_eq!(*session.current_player(), first);
        assert_eq!(*session.phase(), Phase::AwaitingStart);
        assert_eq!(*session.starting_mark(), Mark::from_player_index(first));
        assert_eq!(session.button_state(), ButtonState::Start);
    }

    #[test]
    fn test_coin_flip_with_is_deterministic_per_seed() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut a = GameSession::new();
        let mut b = GameSession::new();
        let first_a = a.coin_flip_with(&mut StdRng::seed_from_u64(7)).unwrap();
        let first_b = b.coin_flip_with(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first_a, first_b);
        assert!(first_a < 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_second_coin_flip_fails() {
        let (mut session, _) = flipped_session();
        assert_eq!(session.coin_flip().unwrap_err(), SessionError::AlreadyFlipped);
    }

    #[test]
    fn test_move_before_coin_flip_fails() {
        let mut session = GameSession::new();
        session.join().unwrap();
        session.join().unwrap();
        assert_eq!(session.play(0, 0).unwrap_err(), SessionError::NotYourTurn);
        assert_eq!(*session.board(), Board::new());
    }

    #[test]
    fn test_turns_alternate() {
        let (mut session, first) = flipped_session();
        let second = (first + 1) % 2;

        session.play(first, 0).unwrap();
        assert_eq!(*session.phase(), Phase::InProgress);
        assert_eq!(*session.current_player(), second);

        session.play(second, 4).unwrap();
        assert_eq!(*session.current_player(), first);
    }

    #[test]
    fn test_out_of_turn_move_fails_without_mutation() {
        let (mut session, first) = flipped_session();
        let second = (first + 1) % 2;
        assert_eq!(session.play(second, 0).unwrap_err(), SessionError::NotYourTurn);
        assert_eq!(*session.board(), Board::new());
        assert_eq!(*session.current_player(), first);
    }

    #[test]
    fn test_out_of_range_player_fails() {
        let (mut session, _) = flipped_session();
        assert_eq!(session.play(2, 0).unwrap_err(), SessionError::NotYourTurn);
    }

    #[test]
    fn test_occupied_cell_fails_without_mutation() {
        let (mut session, first) = flipped_session();
        let second = (first + 1) % 2;
        session.play(first, 5).unwrap();
        let err = session.play(second, 5).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidMove(MoveError::Occupied { position: 5 })
        );
        // Turn did not advance on the failed move.
        assert_eq!(*session.current_player(), second);
    }

    #[test]
    fn test_out_of_range_position_fails() {
        let (mut session, first) = flipped_session();
        let err = session.play(first, 16).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidMove(MoveError::OutOfRange { position: 16 })
        );
        assert_eq!(*session.phase(), Phase::AwaitingStart);
    }

    /// Plays O onto the top row while X plays harmless cells, whichever
    /// player the coin flip chose to start.
    fn play_o_wins_top_row(session: &mut GameSession, first: usize) {
        let moves: &[(usize, usize)] = if first == 0 {
            // O starts: O and X alternate, O claiming the top row.
            &[(0, 0), (1, 4), (0, 1), (1, 5), (0, 2), (1, 6), (0, 3)]
        } else {
            // X starts with a cell off the top row and off X's own lines.
            &[(1, 4), (0, 0), (1, 5), (0, 1), (1, 6), (0, 2), (1, 12), (0, 3)]
        };
        for &(player, position) in moves {
            session.play(player, position).unwrap();
        }
    }

    #[test]
    fn test_winning_move_finishes_game_and_promotes_winner() {
        let (mut session, first) = flipped_session();
        play_o_wins_top_row(&mut session, first);

        assert_eq!(*session.phase(), Phase::Finished(Outcome::Winner(Mark::O)));
        assert_eq!(*session.last_winner(), Some(Mark::O));
        // The winner starts the next game.
        assert_eq!(*session.starting_mark(), Some(Mark::O));
        assert_eq!(session.button_state(), ButtonState::Start);
        // Moves after the game is over are rejected.
        assert_eq!(session.play(0, 8).unwrap_err(), SessionError::NotYourTurn);
    }

    #[test]
    fn test_winning_move_reports_line() {
        let (mut session, first) = flipped_session();
        // Replay the same game but capture the final report.
        let (setup, last): (&[(usize, usize)], (usize, usize)) = if first == 0 {
            (&[(0, 0), (1, 4), (0, 1), (1, 5), (0, 2), (1, 6)], (0, 3))
        } else {
            (
                &[(1, 4), (0, 0), (1, 5), (0, 1), (1, 6), (0, 2), (1, 12)],
                (0, 3),
            )
        };
        for &(player, position) in setup {
            session.play(player, position).unwrap();
        }
        let report = session.play(last.0, last.1).unwrap();
        let win = report.win().unwrap();
        assert_eq!(*win.mark(), Mark::O);
        assert_eq!(*win.line(), [0, 1, 2, 3]);
        assert!(!report.draw());
    }

    /// Interleaved fill order that ends in a draw: O takes
    /// {0,1,6,7,8,9,14,15}, X takes {2,3,4,5,10,11,12,13}; neither set
    /// contains a winning line.
    fn drawn_game_moves(first: usize) -> Vec<(usize, usize)> {
        let o_cells = [0, 1, 6, 7, 8, 9, 14, 15];
        let x_cells = [2, 3, 4, 5, 10, 11, 12, 13];
        let mut moves = Vec::with_capacity(16);
        for i in 0..8 {
            if first == 0 {
                moves.push((0, o_cells[i]));
                moves.push((1, x_cells[i]));
            } else {
                moves.push((1, x_cells[i]));
                moves.push((0, o_cells[i]));
            }
        }
        moves
    }

    #[test]
    fn test_draw_finishes_game_and_preserves_starting_mark() {
        let (mut session, first) = flipped_session();
        let starting_before = *session.starting_mark();

        let moves = drawn_game_moves(first);
        let (last, rest) = moves.split_last().unwrap();
        for &(player, position) in rest {
            let report = session.play(player, position).unwrap();
            assert!(report.win().is_none());
            assert!(!report.draw());
        }
        let report = session.play(last.0, last.1).unwrap();
        assert!(report.win().is_none());
        assert!(report.draw());

        assert_eq!(*session.phase(), Phase::Finished(Outcome::Draw));
        assert_eq!(*session.last_winner(), None);
        assert_eq!(*session.starting_mark(), starting_before);
        assert_eq!(session.button_state(), ButtonState::Clear);
    }

    #[test]
    fn test_reset_after_win_starts_fresh_with_winner_first() {
        let (mut session, first) = flipped_session();
        play_o_wins_top_row(&mut session, first);

        session.reset().unwrap();
        assert_eq!(*session.phase(), Phase::AwaitingStart);
        assert_eq!(*session.board(), Board::new());
        // O won, so O (player 0) starts the next game.
        assert_eq!(*session.current_player(), 0);
        assert_eq!(*session.starting_mark(), Some(Mark::O));
        assert_eq!(*session.last_winner(), Some(Mark::O));
    }

    #[test]
    fn test_reset_keeps_coin_flip_disabled() {
        let (mut session, first) = flipped_session();
        play_o_wins_top_row(&mut session, first);
        session.reset().unwrap();
        assert_eq!(session.coin_flip().unwrap_err(), SessionError::AlreadyFlipped);
    }

    #[test]
    fn test_reset_before_coin_flip_fails() {
        let mut session = GameSession::new();
        assert_eq!(session.reset().unwrap_err(), SessionError::ResetUnavailable);
    }

    #[test]
    fn test_reset_during_game_fails() {
        let (mut session, first) = flipped_session();
        session.play(first, 0).unwrap();
        assert_eq!(session.reset().unwrap_err(), SessionError::ResetUnavailable);
    }

    #[test]
    fn test_reset_from_awaiting_start_is_allowed() {
        // The client's Start button reuses reset right after the flip.
        let (mut session, first) = flipped_session();
        session.reset().unwrap();
        assert_eq!(*session.phase(), Phase::AwaitingStart);
        assert_eq!(*session.current_player(), first);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let (mut session, first) = flipped_session();
        session.play(first, 3).unwrap();

        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["winner"], false);
        assert_eq!(json["board"].as_array().unwrap().len(), 16);
        assert_eq!(json["board"][3], if first == 0 { "O" } else { "X" });
        assert_eq!(json["buttonState"], "start");
        assert_eq!(json["currentPlayer"], (first + 1) % 2);
        assert_eq!(json["lastWinner"], serde_json::Value::Null);
        assert_eq!(
            json["startingPlayer"],
            if first == 0 { "O" } else { "X" }
        );
    }
}
