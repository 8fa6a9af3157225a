//! Random role assignment for a full session.

use crate::board::Mark;
use crate::session::{GameSession, PLAYER_LIMIT};
use rand::Rng;
use tracing::{debug, instrument};

/// One draw from the (mark x first turn) space for a pair of players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    /// Mark of the first player in join order; the second gets the other.
    pub first_mark: Mark,
    /// Whether the first player in join order moves first.
    pub first_moves: bool,
}

impl Roles {
    /// Draws roles uniformly from the four possible assignments.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let pick: u8 = rng.random_range(0..4);
        Self {
            first_mark: if pick & 1 == 0 { Mark::X } else { Mark::O },
            first_moves: pick & 2 == 0,
        }
    }
}

/// Returns a copy of `session` with marks and turns assigned to its two
/// players. Sessions without exactly two players are returned unchanged.
#[instrument(skip(session, rng), fields(session_id = %session.id()))]
pub fn assign_roles<R: Rng + ?Sized>(session: &GameSession, rng: &mut R) -> GameSession {
    let mut next = session.clone();
    if next.players.len() != PLAYER_LIMIT {
        debug!(players = next.players.len(), "Not enough players for roles");
        return next;
    }

    let roles = Roles::draw(rng);
    let (first, second) = next.players.split_at_mut(1);
    let (first, second) = (&mut first[0], &mut second[0]);

    first.mark = Some(roles.first_mark);
    first.is_turn = roles.first_moves;
    second.mark = Some(roles.first_mark.opponent());
    second.is_turn = !roles.first_moves;

    debug!(
        first = %first.player_id,
        first_mark = %roles.first_mark,
        first_moves = roles.first_moves,
        "Roles assigned"
    );
    next
}
