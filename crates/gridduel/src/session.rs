//! Session and player values.
//!
//! A [`GameSession`] is an immutable snapshot. Operations derive a new
//! session from the current one and publish it through the
//! [`SessionStore`](crate::SessionStore); nothing edits a stored session in
//! place.

use crate::board::{Board, Mark};
use crate::win::WinCondition;
use derive_getters::Getters;
use derive_more::{Display, From, FromStr};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Maximum number of players seated in one session.
pub const PLAYER_LIMIT: usize = 2;

/// Opaque player identifier supplied by the caller.
pub type PlayerId = String;

/// Unique identifier for a game session, allocated by the store.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    FromStr,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// A player seated in a session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub(crate) player_id: PlayerId,
    pub(crate) nickname: String,
    pub(crate) mark: Option<Mark>,
    pub(crate) is_turn: bool,
    pub(crate) wins: u32,
    pub(crate) rematch_request: bool,
}

impl Player {
    /// Creates a freshly joined player with no role yet.
    #[instrument]
    pub fn new(player_id: PlayerId, nickname: String) -> Self {
        Self {
            player_id,
            nickname,
            mark: None,
            is_turn: false,
            wins: 0,
            rematch_request: false,
        }
    }
}

/// One two-player game, from matchmaking through rematches.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub(crate) id: SessionId,
    /// Seated players in join order.
    pub(crate) players: Vec<Player>,
    pub(crate) board: Board,
    /// Lines that can still be won this game.
    pub(crate) win_conditions: Vec<WinCondition>,
    /// Number of seated players that asked for a rematch.
    pub(crate) rematch_consents: usize,
    pub(crate) is_finished: bool,
    pub(crate) won_by: Option<PlayerId>,
    pub(crate) winner_cells: Option<WinCondition>,
    /// Games completed in this session's lineage.
    pub(crate) count: u32,
}

impl GameSession {
    /// Creates an empty session waiting for players.
    #[instrument(skip(win_conditions), fields(lines = win_conditions.len()))]
    pub fn new(id: SessionId, board_width: usize, win_conditions: Vec<WinCondition>) -> Self {
        Self {
            id,
            players: Vec::new(),
            board: Board::new(board_width),
            win_conditions,
            rematch_consents: 0,
            is_finished: false,
            won_by: None,
            winner_cells: None,
            count: 0,
        }
    }

    /// Number of seated players.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn players_joined(&self) -> usize {
        self.players.len()
    }

    /// Checks if matchmaking may seat another player here.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn has_room(&self) -> bool {
        self.players.len() < PLAYER_LIMIT && !self.is_finished
    }

    /// Gets the player with the given id.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Checks if the player is seated here.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn contains(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    /// The player currently holding the turn, if any.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn turn_holder(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_turn)
    }

    /// Seated player other than `player_id`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn opponent_of(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id != player_id)
    }

    pub(crate) fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    /// Recounts rematch consent from the players' flags.
    pub(crate) fn recount_consents(&mut self) {
        self.rematch_consents = self.players.iter().filter(|p| p.rematch_request).count();
    }

    /// Returns a copy without `player_id`, consent recounted.
    pub(crate) fn without_player(&self, player_id: &str) -> Self {
        let mut next = self.clone();
        next.players.retain(|p| p.player_id != player_id);
        next.recount_consents();
        next
    }
}
