//! Error types for session operations.

use crate::session::{PlayerId, SessionId};
use derive_more::{Display, Error};
use tracing::instrument;

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveRejection {
    /// The game in this session is already over.
    #[display("game is already finished")]
    GameFinished,
    /// The player is not seated in this session.
    #[display("player {_0} is not in this session")]
    UnknownPlayer(PlayerId),
    /// The player does not hold the turn.
    #[display("it is not {_0}'s turn")]
    NotYourTurn(PlayerId),
    /// The cell index lies outside the board.
    #[display("cell {cell} is outside a board of {cells} cells")]
    OutOfBounds {
        /// Requested cell index.
        cell: usize,
        /// Number of cells on the board.
        cells: usize,
    },
    /// The cell has already been claimed.
    #[display("cell {_0} is already occupied")]
    CellOccupied(usize),
}

/// Why an operation is not meaningful in the session's current phase.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StateRejection {
    /// The operation needs a finished game.
    #[display("game is not finished")]
    NotFinished,
    /// The operation needs a game in progress.
    #[display("game is already finished")]
    AlreadyFinished,
    /// Reset was requested before every player asked for a rematch.
    #[display("{consents} of {players} players requested a rematch")]
    ConsentIncomplete {
        /// Players that requested a rematch.
        consents: usize,
        /// Players seated in the session.
        players: usize,
    },
    /// The player is not seated in this session.
    #[display("player {_0} is not in this session")]
    UnknownPlayer(PlayerId),
    /// Matchmaking found the session full or finished once it held the lock.
    #[display("session has no free seat")]
    NoFreeSeat,
}

/// Kinds of failure surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameErrorKind {
    /// No session is stored under the given id.
    #[display("Session not found: {_0}")]
    SessionNotFound(SessionId),
    /// The move was rejected before any state changed.
    #[display("Invalid move: {_0}")]
    InvalidMove(MoveRejection),
    /// The operation does not apply to the session's phase.
    #[display("Invalid state: {_0}")]
    InvalidState(StateRejection),
}

/// Engine error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct GameError {
    /// What went wrong.
    pub kind: GameErrorKind,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl GameError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: GameErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`GameErrorKind::SessionNotFound`].
    #[track_caller]
    pub fn session_not_found(id: SessionId) -> Self {
        Self::new(GameErrorKind::SessionNotFound(id))
    }

    /// Shorthand for [`GameErrorKind::InvalidMove`].
    #[track_caller]
    pub fn invalid_move(reason: MoveRejection) -> Self {
        Self::new(GameErrorKind::InvalidMove(reason))
    }

    /// Shorthand for [`GameErrorKind::InvalidState`].
    #[track_caller]
    pub fn invalid_state(reason: StateRejection) -> Self {
        Self::new(GameErrorKind::InvalidState(reason))
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &GameErrorKind {
        &self.kind
    }
}

// Location is diagnostic only; two errors are equal when their kinds are.
impl PartialEq for GameError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for GameError {}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
