//! Board and cell types.

use crate::session::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Mark a player places on the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mark {
    /// The "x" mark.
    X,
    /// The "o" mark.
    O,
}

impl Mark {
    /// Returns the complementary mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Who claimed a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupant {
    /// Player that claimed the cell.
    pub player_id: PlayerId,
    /// Mark that player was playing with.
    pub mark: Mark,
}

/// A single board cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Row of the cell.
    pub row: usize,
    /// Column of the cell.
    pub col: usize,
    /// Claiming player, absent while the cell is free.
    pub occupant: Option<Occupant>,
}

/// Square grid of cells, indexed row-major from 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl Board {
    /// Creates an empty `width` x `width` board.
    #[instrument]
    pub fn new(width: usize) -> Self {
        let rows = (0..width)
            .map(|row| {
                (0..width)
                    .map(|col| Cell {
                        row,
                        col,
                        occupant: None,
                    })
                    .collect()
            })
            .collect();
        Self { width, rows }
    }

    /// Board width (and height).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width * self.width
    }

    /// Converts a flat cell index to `(row, col)`.
    ///
    /// This is the only place the index convention lives; the board and the
    /// win evaluator both go through it.
    pub fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.cell_count() {
            return None;
        }
        Some((index / self.width, index % self.width))
    }

    /// Returns the cell at a flat index.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        let (row, col) = self.locate(index)?;
        Some(&self.rows[row][col])
    }

    /// Returns the occupant of a cell, if the index is valid and claimed.
    pub fn occupant(&self, index: usize) -> Option<&Occupant> {
        self.cell(index).and_then(|cell| cell.occupant.as_ref())
    }

    /// Checks if a cell exists and is unclaimed.
    pub fn is_free(&self, index: usize) -> bool {
        matches!(self.cell(index), Some(Cell { occupant: None, .. }))
    }

    /// Checks if every cell has been claimed.
    pub fn is_full(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| cell.occupant.is_some())
    }

    /// Rows of the board.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns a copy of the board with `index` claimed by `occupant`.
    ///
    /// Returns `None` when the index is out of bounds or already claimed;
    /// a claimed cell is never overwritten.
    pub fn with_claim(&self, index: usize, occupant: Occupant) -> Option<Self> {
        let (row, col) = self.locate(index)?;
        if self.rows[row][col].occupant.is_some() {
            return None;
        }
        let mut next = self.clone();
        next.rows[row][col].occupant = Some(occupant);
        Some(next)
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (r, row) in self.rows.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match &cell.occupant {
                    Some(occ) => occ.mark.to_string().to_uppercase(),
                    None => (r * self.width + cell.col).to_string(),
                })
                .collect();
            result.push_str(&line.join("|"));
            if r + 1 < self.width {
                result.push('\n');
            }
        }
        result
    }
}
