//! First-class session invariants.
//!
//! Invariants are logical properties every published session must satisfy.
//! The store checks them on each write; they are testable independently.

use crate::session::{GameSession, PLAYER_LIMIT};
use std::collections::HashSet;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let checks = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
            (I4::holds(state), I4::description()),
        ];
        let violations: Vec<_> = checks
            .into_iter()
            .filter(|(holds, _)| !holds)
            .map(|(_, description)| InvariantViolation::new(description))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// At most two players, each id seated once.
pub struct PlayerLimitInvariant;

impl Invariant<GameSession> for PlayerLimitInvariant {
    fn holds(session: &GameSession) -> bool {
        let ids: HashSet<&str> = session
            .players()
            .iter()
            .map(|p| p.player_id().as_str())
            .collect();
        session.players().len() <= PLAYER_LIMIT && ids.len() == session.players().len()
    }

    fn description() -> &'static str {
        "A session seats at most two distinct players"
    }
}

/// Exactly one turn holder while a game with assigned roles is running.
pub struct SingleTurnInvariant;

impl Invariant<GameSession> for SingleTurnInvariant {
    fn holds(session: &GameSession) -> bool {
        let players = session.players();
        let roles_assigned =
            players.len() == PLAYER_LIMIT && players.iter().all(|p| p.mark().is_some());
        if *session.is_finished() || !roles_assigned {
            return true;
        }
        players.iter().filter(|p| *p.is_turn()).count() == 1
    }

    fn description() -> &'static str {
        "Exactly one player holds the turn during play"
    }
}

/// Assigned marks differ between the two players.
pub struct DistinctMarksInvariant;

impl Invariant<GameSession> for DistinctMarksInvariant {
    fn holds(session: &GameSession) -> bool {
        match session.players().as_slice() {
            [a, b] => a.mark().is_none() || b.mark().is_none() || a.mark() != b.mark(),
            _ => true,
        }
    }

    fn description() -> &'static str {
        "Players carry distinct marks"
    }
}

/// Winner and winning line are only recorded on finished games.
pub struct OutcomeInvariant;

impl Invariant<GameSession> for OutcomeInvariant {
    fn holds(session: &GameSession) -> bool {
        let finished = *session.is_finished();
        let has_winner = session.won_by().is_some();
        let has_line = session.winner_cells().is_some();
        (finished || (!has_winner && !has_line)) && (!has_line || has_winner)
    }

    fn description() -> &'static str {
        "Winner and winning line appear only on finished games"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    PlayerLimitInvariant,
    SingleTurnInvariant,
    DistinctMarksInvariant,
    OutcomeInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Mark;
    use crate::session::{Player, SessionId};
    use crate::win::{WinCondition, standard_lines};

    fn seated() -> GameSession {
        let mut session = GameSession::new(SessionId(3), 3, standard_lines(3));
        let mut a = Player::new("a".into(), "A".into());
        a.mark = Some(Mark::X);
        a.is_turn = true;
        let mut b = Player::new("b".into(), "B".into());
        b.mark = Some(Mark::O);
        session.players = vec![a, b];
        session
    }

    #[test]
    fn test_valid_session_holds() {
        assert!(SessionInvariants::check_all(&seated()).is_ok());
    }

    #[test]
    fn test_empty_session_holds() {
        let session = GameSession::new(SessionId(1), 3, standard_lines(3));
        assert!(SessionInvariants::check_all(&session).is_ok());
    }

    #[test]
    fn test_two_turn_holders_detected() {
        let mut session = seated();
        session.players[1].is_turn = true;
        let violations = SessionInvariants::check_all(&session).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].description, SingleTurnInvariant::description());
    }

    #[test]
    fn test_same_marks_detected() {
        let mut session = seated();
        session.players[1].mark = Some(Mark::X);
        assert!(!DistinctMarksInvariant::holds(&session));
    }

    #[test]
    fn test_duplicate_player_detected() {
        let mut session = seated();
        session.players[1].player_id = "a".into();
        assert!(!PlayerLimitInvariant::holds(&session));
    }

    #[test]
    fn test_winner_on_running_game_detected() {
        let mut session = seated();
        session.won_by = Some("a".into());
        session.winner_cells = Some(WinCondition([0, 1, 2]));
        assert!(!OutcomeInvariant::holds(&session));
        session.is_finished = true;
        assert!(OutcomeInvariant::holds(&session));
    }
}
