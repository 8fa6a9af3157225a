//! Win and draw evaluation.
//!
//! Evaluation is a pure function of the board and the lines that can still
//! be won. Lines blocked by both players are pruned as the board fills, so
//! the candidate set only ever shrinks during a game.

use crate::board::{Board, Occupant};
use crate::session::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Three flat cell indices forming a sanctioned winning line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinCondition(pub [usize; 3]);

impl WinCondition {
    /// Returns the cell indices of the line.
    pub fn cells(&self) -> [usize; 3] {
        self.0
    }
}

impl From<[usize; 3]> for WinCondition {
    fn from(cells: [usize; 3]) -> Self {
        Self(cells)
    }
}

/// Generates the canonical lines for a `width` x `width` board.
///
/// Every run of three consecutive cells counts: rows first, then columns,
/// then main diagonals, then anti-diagonals. For a 3x3 board this yields the
/// classic eight lines in the classic order.
#[instrument]
pub fn standard_lines(width: usize) -> Vec<WinCondition> {
    let mut lines = Vec::new();
    if width < 3 {
        return lines;
    }
    let at = |row: usize, col: usize| row * width + col;

    for row in 0..width {
        for col in 0..=width - 3 {
            lines.push(WinCondition([at(row, col), at(row, col + 1), at(row, col + 2)]));
        }
    }
    for col in 0..width {
        for row in 0..=width - 3 {
            lines.push(WinCondition([at(row, col), at(row + 1, col), at(row + 2, col)]));
        }
    }
    for row in 0..=width - 3 {
        for col in 0..=width - 3 {
            lines.push(WinCondition([
                at(row, col),
                at(row + 1, col + 1),
                at(row + 2, col + 2),
            ]));
        }
    }
    for row in 0..=width - 3 {
        for col in 2..width {
            lines.push(WinCondition([
                at(row, col),
                at(row + 1, col - 1),
                at(row + 2, col - 2),
            ]));
        }
    }
    lines
}

/// Terminal state reported by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A player completed a line.
    Won {
        /// The winning player.
        player_id: PlayerId,
        /// The completed line.
        line: WinCondition,
    },
    /// No line can be won any more.
    Draw,
    /// Play continues.
    Ongoing,
}

/// Result of evaluating a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Whether and how the game ended.
    pub outcome: Outcome,
    /// Lines that can still be won, in their original order.
    pub surviving: Vec<WinCondition>,
}

impl Evaluation {
    /// Checks if the game is over.
    pub fn is_finished(&self) -> bool {
        !matches!(self.outcome, Outcome::Ongoing)
    }
}

/// Evaluates `board` against the lines that are still in play.
///
/// The first line (in list order) fully held by one player wins. A line with
/// two cells held by different players can never be won and is dropped from
/// the returned set. An empty surviving set is a draw.
#[instrument(skip(board, conditions), fields(candidates = conditions.len()))]
pub fn evaluate(board: &Board, conditions: &[WinCondition]) -> Evaluation {
    let mut surviving = Vec::with_capacity(conditions.len());

    for condition in conditions {
        let held: [Option<&Occupant>; 3] = condition.cells().map(|i| board.occupant(i));

        if let [Some(a), Some(b), Some(c)] = held {
            if a.player_id == b.player_id && b.player_id == c.player_id {
                debug!(player_id = %a.player_id, line = ?condition.cells(), "Line completed");
                return Evaluation {
                    outcome: Outcome::Won {
                        player_id: a.player_id.clone(),
                        line: *condition,
                    },
                    surviving: conditions.to_vec(),
                };
            }
        }

        if is_blocked(&held) {
            continue;
        }
        surviving.push(*condition);
    }

    debug!(
        pruned = conditions.len() - surviving.len(),
        remaining = surviving.len(),
        "Pruned blocked lines"
    );

    let outcome = if surviving.is_empty() {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    };
    Evaluation { outcome, surviving }
}

/// A line is blocked once two of its cells belong to different players.
fn is_blocked(held: &[Option<&Occupant>; 3]) -> bool {
    let differ = |a: Option<&Occupant>, b: Option<&Occupant>| match (a, b) {
        (Some(a), Some(b)) => a.player_id != b.player_id,
        _ => false,
    };
    let [a, b, c] = *held;
    differ(a, b) || differ(b, c) || differ(a, c)
}
