//! The operations offered to the transport layer.

use crate::config::GameConfig;
use crate::engine::apply_move;
use crate::error::{GameError, GameErrorKind, StateRejection};
use crate::rematch::{consent_complete, request_rematch, reset_session, resign_session};
use crate::roles::assign_roles;
use crate::session::{GameSession, PLAYER_LIMIT, Player, SessionId};
use crate::store::SessionStore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

/// Entry point for every session operation.
///
/// Cloning is cheap; clones share the same store, configuration and random
/// source.
#[derive(Debug, Clone)]
pub struct GameManager {
    store: SessionStore,
    config: Arc<GameConfig>,
    rng: Arc<Mutex<StdRng>>,
    /// Serialises matchmaking so two joins never race for one free seat.
    matchmaking: Arc<Mutex<()>>,
}

impl GameManager {
    /// Creates a manager with an empty store and an OS-seeded random source.
    #[instrument(skip(config))]
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(SessionStore::new(), config, StdRng::from_os_rng())
    }

    /// Creates a manager with a deterministic random source.
    #[instrument(skip(config))]
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(SessionStore::new(), config, StdRng::seed_from_u64(seed))
    }

    /// Creates a manager over an existing store.
    #[instrument(skip_all)]
    pub fn with_rng(store: SessionStore, config: GameConfig, rng: StdRng) -> Self {
        info!(
            board_width = config.board_width(),
            lines = config.win_conditions().len(),
            "Creating game manager"
        );
        Self {
            store,
            config: Arc::new(config),
            rng: Arc::new(Mutex::new(rng)),
            matchmaking: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The board configuration new sessions are built from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_session(&self, id: SessionId) -> GameSession {
        GameSession::new(
            id,
            *self.config.board_width(),
            self.config.win_conditions().clone(),
        )
    }

    /// Seats a player in the first session with room, creating one if none.
    ///
    /// Filling the second seat assigns marks and the first turn. The player
    /// is also removed from every finished session they were still listed
    /// in. A player already waiting in an open session gets that session
    /// back unchanged.
    #[instrument(skip(self))]
    pub fn join(&self, player_id: &str, nickname: &str) -> Result<GameSession, GameError> {
        let _guard = self
            .matchmaking
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let snapshots = self.store.snapshots();
        if let Some(seated) = snapshots
            .iter()
            .find(|s| !*s.is_finished() && s.contains(player_id))
        {
            info!(session_id = %seated.id(), player_id, "Player already seated");
            return Ok(seated.clone());
        }

        let player = Player::new(player_id.to_string(), nickname.to_string());
        let session = loop {
            let target = self
                .store
                .snapshots()
                .iter()
                .find(|s| s.has_room())
                .map(|s| *s.id())
                .unwrap_or_else(|| *self.store.create(|id| self.fresh_session(id)).id());

            let seated = self.store.update(target, |current| {
                // A lone player may have resigned since the scan.
                if !current.has_room() {
                    return Err(GameError::invalid_state(StateRejection::NoFreeSeat));
                }
                let mut next = current.clone();
                next.players.push(player.clone());
                if next.players.len() == PLAYER_LIMIT {
                    next = assign_roles(&next, &mut *self.rng());
                }
                Ok(next)
            });
            match seated {
                Ok(session) => break session,
                Err(e) if e.kind == GameErrorKind::InvalidState(StateRejection::NoFreeSeat) => {
                    debug!(session_id = %target, "Seat taken before lock, rescanning");
                }
                Err(e) => return Err(e),
            }
        };
        info!(
            session_id = %session.id(),
            player_id,
            players = session.players_joined(),
            "Player joined"
        );

        self.leave_finished(player_id, Some(*session.id()))?;
        Ok(session)
    }

    /// Plays `player_id`'s mark on `cell`.
    #[instrument(skip(self))]
    pub fn play(
        &self,
        game_id: SessionId,
        player_id: &str,
        cell: usize,
    ) -> Result<GameSession, GameError> {
        self.store
            .update(game_id, |session| apply_move(session, player_id, cell))
    }

    /// Forfeits the running game to the opponent.
    #[instrument(skip(self))]
    pub fn resign(&self, game_id: SessionId, player_id: &str) -> Result<GameSession, GameError> {
        self.store
            .update(game_id, |session| resign_session(session, player_id))
    }

    /// Records a rematch request; resets the session once everyone agreed.
    #[instrument(skip(self))]
    pub fn rematch(&self, game_id: SessionId, player_id: &str) -> Result<GameSession, GameError> {
        self.store.update(game_id, |session| {
            let next = request_rematch(session, player_id)?;
            if consent_complete(&next) {
                debug!("All players agreed, resetting");
                return reset_session(&next, &self.config, &mut *self.rng());
            }
            Ok(next)
        })
    }

    /// Starts the next game once every seated player asked for a rematch.
    #[instrument(skip(self))]
    pub fn reset(&self, game_id: SessionId) -> Result<GameSession, GameError> {
        self.store.update(game_id, |session| {
            reset_session(session, &self.config, &mut *self.rng())
        })
    }

    /// Removes a player from every finished session that still lists them.
    ///
    /// Returns the updated sessions.
    #[instrument(skip(self))]
    pub fn leave(&self, player_id: &str) -> Result<Vec<GameSession>, GameError> {
        self.leave_finished(player_id, None)
    }

    fn leave_finished(
        &self,
        player_id: &str,
        keep: Option<SessionId>,
    ) -> Result<Vec<GameSession>, GameError> {
        let stale: Vec<SessionId> = self
            .store
            .snapshots()
            .into_iter()
            .filter(|s| Some(*s.id()) != keep && *s.is_finished() && s.contains(player_id))
            .map(|s| *s.id())
            .collect();

        let mut left = Vec::with_capacity(stale.len());
        for id in stale {
            let session = self.store.update(id, |current| {
                // Re-checked under the session lock; a reset may have raced us.
                if *current.is_finished() {
                    let next = current.without_player(player_id);
                    // The players left behind may all have asked for a rematch already.
                    if consent_complete(&next) {
                        return reset_session(&next, &self.config, &mut *self.rng());
                    }
                    Ok(next)
                } else {
                    Ok(current.clone())
                }
            })?;
            info!(session_id = %id, player_id, "Removed player from finished session");
            left.push(session);
        }
        Ok(left)
    }

    /// Gets a snapshot of a session.
    #[instrument(skip(self))]
    pub fn get_by_id(&self, game_id: SessionId) -> Option<GameSession> {
        self.store.get(game_id)
    }

    /// Snapshots of every session in id order.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<GameSession> {
        let sessions = self.store.snapshots();
        debug!(count = sessions.len(), "Listed sessions");
        sessions
    }

    /// Ids of sessions the player is seated in.
    #[instrument(skip(self))]
    pub fn sessions_of(&self, player_id: &str) -> Vec<SessionId> {
        self.store
            .snapshots()
            .iter()
            .filter(|s| s.contains(player_id))
            .map(|s| *s.id())
            .collect()
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

