//! Rematch negotiation, reset and resignation.

use crate::config::GameConfig;
use crate::error::{GameError, StateRejection};
use crate::roles::assign_roles;
use crate::session::{GameSession, Player};
use rand::Rng;
use tracing::{info, instrument, warn};

fn reject(reason: StateRejection) -> GameError {
    warn!(%reason, "Request rejected");
    GameError::invalid_state(reason)
}

/// Records `player_id`'s wish to play again on a finished session.
///
/// Repeated requests from the same player count once.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn request_rematch(session: &GameSession, player_id: &str) -> Result<GameSession, GameError> {
    if !session.is_finished {
        return Err(reject(StateRejection::NotFinished));
    }
    let mut next = session.clone();
    let player = next
        .player_mut(player_id)
        .ok_or_else(|| reject(StateRejection::UnknownPlayer(player_id.to_string())))?;
    player.rematch_request = true;
    next.recount_consents();
    info!(
        player_id,
        consents = next.rematch_consents,
        players = next.players_joined(),
        "Rematch requested"
    );
    Ok(next)
}

/// Checks if every seated player asked for a rematch.
pub fn consent_complete(session: &GameSession) -> bool {
    session.is_finished
        && !session.players.is_empty()
        && session.rematch_consents == session.players.len()
}

/// Starts a new game in the same session once everyone consented.
///
/// The board and line set start over and roles are drawn again. The session
/// id, the game count and each player's wins carry over. A player left alone
/// (their opponent moved on) waits without a role until matchmaking seats a
/// new opponent.
#[instrument(skip(session, config, rng), fields(session_id = %session.id()))]
pub fn reset_session<R: Rng + ?Sized>(
    session: &GameSession,
    config: &GameConfig,
    rng: &mut R,
) -> Result<GameSession, GameError> {
    if !session.is_finished {
        return Err(reject(StateRejection::NotFinished));
    }
    if !consent_complete(session) {
        return Err(reject(StateRejection::ConsentIncomplete {
            consents: session.rematch_consents,
            players: session.players.len(),
        }));
    }

    let mut fresh = GameSession::new(
        session.id,
        *config.board_width(),
        config.win_conditions().clone(),
    );
    fresh.count = session.count;
    fresh.players = session
        .players
        .iter()
        .map(|p| Player {
            wins: p.wins,
            ..Player::new(p.player_id.clone(), p.nickname.clone())
        })
        .collect();

    let next = assign_roles(&fresh, rng);
    info!(count = next.count, players = next.players_joined(), "Session reset");
    Ok(next)
}

/// Ends the game with `player_id` forfeiting to their opponent.
///
/// The opponent is credited with a win and the game counts, the same as a
/// game won on the board. Resigning while still waiting for an opponent just
/// closes the session.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn resign_session(session: &GameSession, player_id: &str) -> Result<GameSession, GameError> {
    if session.is_finished {
        return Err(reject(StateRejection::AlreadyFinished));
    }
    if !session.contains(player_id) {
        return Err(reject(StateRejection::UnknownPlayer(player_id.to_string())));
    }

    let mut next = session.clone();
    next.is_finished = true;
    next.winner_cells = None;
    next.won_by = session.opponent_of(player_id).map(|p| p.player_id.clone());

    if let Some(winner) = next.won_by.clone() {
        if let Some(p) = next.player_mut(&winner) {
            p.wins += 1;
        }
        next.count += 1;
        info!(player_id, winner = %winner, "Player resigned");
    } else {
        info!(player_id, "Player resigned before an opponent joined");
    }
    Ok(next)
}
