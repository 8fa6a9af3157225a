//! Move validation and application.

use crate::board::Occupant;
use crate::error::{GameError, MoveRejection};
use crate::session::GameSession;
use crate::win::{Outcome, evaluate};
use tracing::{info, instrument, warn};

/// Applies `player_id`'s move on `cell`, returning the successor session.
///
/// Every precondition is re-checked here even if the caller validated the
/// request already: the session must be running, the player seated and
/// holding the turn, and the cell on the board and free.
///
/// A terminal move records the outcome, bumps the game count and credits the
/// winner; turns are not advanced. Otherwise the pruned line set is kept and
/// the turn passes to the other player.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn apply_move(
    session: &GameSession,
    player_id: &str,
    cell: usize,
) -> Result<GameSession, GameError> {
    let reject = |reason: MoveRejection| {
        warn!(player_id, cell, %reason, "Move rejected");
        GameError::invalid_move(reason)
    };

    if session.is_finished {
        return Err(reject(MoveRejection::GameFinished));
    }
    let player = session
        .player(player_id)
        .ok_or_else(|| reject(MoveRejection::UnknownPlayer(player_id.to_string())))?;
    let mark = match player.mark {
        Some(mark) if player.is_turn => mark,
        _ => return Err(reject(MoveRejection::NotYourTurn(player_id.to_string()))),
    };
    let cells = session.board.cell_count();
    if cell >= cells {
        return Err(reject(MoveRejection::OutOfBounds { cell, cells }));
    }
    let board = session
        .board
        .with_claim(
            cell,
            Occupant {
                player_id: player_id.to_string(),
                mark,
            },
        )
        .ok_or_else(|| reject(MoveRejection::CellOccupied(cell)))?;

    let evaluation = evaluate(&board, &session.win_conditions);
    let mut next = session.clone();
    next.board = board;

    match evaluation.outcome {
        Outcome::Won { player_id: winner, line } => {
            info!(winner = %winner, line = ?line.cells(), "Game won");
            if let Some(p) = next.player_mut(&winner) {
                p.wins += 1;
            }
            next.is_finished = true;
            next.won_by = Some(winner);
            next.winner_cells = Some(line);
            next.count += 1;
        }
        Outcome::Draw => {
            info!("Game drawn");
            next.is_finished = true;
            next.won_by = None;
            next.winner_cells = None;
            next.count += 1;
        }
        Outcome::Ongoing => {
            next.win_conditions = evaluation.surviving;
            for p in &mut next.players {
                p.is_turn = !p.is_turn;
            }
            info!(player_id, cell, "Move applied");
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Mark;
    use crate::error::GameErrorKind;
    use crate::session::{Player, SessionId};
    use crate::win::{WinCondition, standard_lines};

    /// alice plays x and moves first.
    fn running() -> GameSession {
        let mut session = GameSession::new(SessionId(1), 3, standard_lines(3));
        let mut alice = Player::new("alice".into(), "Alice".into());
        alice.mark = Some(Mark::X);
        alice.is_turn = true;
        let mut bob = Player::new("bob".into(), "Bob".into());
        bob.mark = Some(Mark::O);
        session.players = vec![alice, bob];
        session
    }

    fn play_all(mut session: GameSession, moves: &[(&str, usize)]) -> GameSession {
        for (who, cell) in moves {
            session = apply_move(&session, who, *cell).unwrap();
        }
        session
    }

    fn rejection(result: Result<GameSession, GameError>) -> MoveRejection {
        match result.unwrap_err().kind {
            GameErrorKind::InvalidMove(reason) => reason,
            other => panic!("expected invalid move, got {other:?}"),
        }
    }

    #[test]
    fn test_move_marks_cell_and_passes_turn() {
        let session = apply_move(&running(), "alice", 4).unwrap();
        let occ = session.board().occupant(4).unwrap();
        assert_eq!(occ.player_id, "alice");
        assert_eq!(occ.mark, Mark::X);
        assert!(!*session.player("alice").unwrap().is_turn());
        assert!(*session.player("bob").unwrap().is_turn());
    }

    #[test]
    fn test_out_of_turn_rejected() {
        let reason = rejection(apply_move(&running(), "bob", 0));
        assert_eq!(reason, MoveRejection::NotYourTurn("bob".into()));
    }

    #[test]
    fn test_unknown_player_rejected() {
        let reason = rejection(apply_move(&running(), "carol", 0));
        assert_eq!(reason, MoveRejection::UnknownPlayer("carol".into()));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let reason = rejection(apply_move(&running(), "alice", 9));
        assert_eq!(reason, MoveRejection::OutOfBounds { cell: 9, cells: 9 });
    }

    #[test]
    fn test_occupied_rejected() {
        let session = play_all(running(), &[("alice", 0)]);
        let reason = rejection(apply_move(&session, "bob", 0));
        assert_eq!(reason, MoveRejection::CellOccupied(0));
    }

    #[test]
    fn test_waiting_session_rejects_moves() {
        let mut session = running();
        session.players.truncate(1);
        session.players[0].mark = None;
        session.players[0].is_turn = false;
        let reason = rejection(apply_move(&session, "alice", 0));
        assert_eq!(reason, MoveRejection::NotYourTurn("alice".into()));
    }

    #[test]
    fn test_winning_move_finishes_without_turn_change() {
        let session = play_all(
            running(),
            &[("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)],
        );
        assert!(*session.is_finished());
        assert_eq!(session.won_by().as_deref(), Some("alice"));
        assert_eq!(*session.winner_cells(), Some(WinCondition([0, 1, 2])));
        assert_eq!(*session.player("alice").unwrap().wins(), 1);
        assert_eq!(*session.player("bob").unwrap().wins(), 0);
        assert_eq!(*session.count(), 1);
        assert!(*session.player("alice").unwrap().is_turn());
    }

    #[test]
    fn test_finished_session_rejects_moves() {
        let session = play_all(
            running(),
            &[("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)],
        );
        let reason = rejection(apply_move(&session, "bob", 5));
        assert_eq!(reason, MoveRejection::GameFinished);
    }

    #[test]
    fn test_non_terminal_move_prunes_lines() {
        let session = play_all(running(), &[("alice", 0), ("bob", 1)]);
        assert!(!session.win_conditions().contains(&WinCondition([0, 1, 2])));
        assert_eq!(session.win_conditions().len(), 7);
    }

    #[test]
    fn test_draw() {
        // o x x / x o o / o x x; the 0-4-8 diagonal stays open until the end
        let session = play_all(
            running(),
            &[
                ("alice", 1),
                ("bob", 0),
                ("alice", 2),
                ("bob", 4),
                ("alice", 3),
                ("bob", 5),
                ("alice", 7),
                ("bob", 6),
            ],
        );
        assert!(!*session.is_finished());
        let session = apply_move(&session, "alice", 8).unwrap();
        assert!(session.board().is_full());
        assert!(*session.is_finished());
        assert_eq!(*session.won_by(), None);
        assert_eq!(*session.winner_cells(), None);
        assert_eq!(*session.count(), 1);
    }
}
