//! Board geometry configuration.

use crate::error::ConfigError;
use crate::win::{WinCondition, standard_lines};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Widest board a configuration may describe.
pub const MAX_BOARD_WIDTH: usize = 64;

/// Board width and the sanctioned winning lines.
///
/// Both fields may be omitted from a config file; the lines default to the
/// standard set for the configured width.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width (and height) of the square board.
    #[serde(default = "default_board_width")]
    board_width: usize,

    /// Lines that win the game when held by one player.
    #[serde(default)]
    win_conditions: Vec<WinCondition>,
}

#[instrument]
fn default_board_width() -> usize {
    3
}

impl GameConfig {
    /// Creates a validated configuration.
    #[instrument(skip(win_conditions), fields(lines = win_conditions.len()))]
    pub fn new(board_width: usize, win_conditions: Vec<WinCondition>) -> Result<Self, ConfigError> {
        let config = Self {
            board_width,
            win_conditions,
        };
        config.validate()?;
        Ok(config)
    }

    /// Classic configuration for a `width` x `width` board with every run
    /// of three as a winning line.
    #[instrument]
    pub fn standard(board_width: usize) -> Result<Self, ConfigError> {
        check_width(board_width)?;
        Self::new(board_width, standard_lines(board_width))
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        check_width(config.board_width)?;
        if config.win_conditions.is_empty() {
            debug!(board_width = config.board_width, "Using standard lines");
            config.win_conditions = standard_lines(config.board_width);
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            board_width = config.board_width,
            lines = config.win_conditions.len(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_width(self.board_width)?;
        if self.win_conditions.is_empty() {
            return Err(ConfigError::new(format!(
                "No winning lines for a board of width {}",
                self.board_width
            )));
        }
        let cells = self
            .board_width
            .checked_mul(self.board_width)
            .ok_or_else(|| ConfigError::new("Board cell count overflows"))?;
        for line in &self.win_conditions {
            let indices = line.cells();
            if let Some(bad) = indices.iter().find(|&&i| i >= cells) {
                return Err(ConfigError::new(format!(
                    "Line {:?} references cell {} outside a board of {} cells",
                    indices, bad, cells
                )));
            }
            if indices.iter().collect::<HashSet<_>>().len() != indices.len() {
                return Err(ConfigError::new(format!(
                    "Line {:?} repeats a cell",
                    indices
                )));
            }
        }
        Ok(())
    }
}

#[instrument]
fn check_width(board_width: usize) -> Result<(), ConfigError> {
    if board_width == 0 {
        return Err(ConfigError::new("Board width must be at least 1"));
    }
    if board_width > MAX_BOARD_WIDTH {
        return Err(ConfigError::new(format!(
            "Board width {} exceeds the maximum of {}",
            board_width, MAX_BOARD_WIDTH
        )));
    }
    Ok(())
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: default_board_width(),
            win_conditions: standard_lines(default_board_width()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_classic() {
        let config = GameConfig::default();
        assert_eq!(*config.board_width(), 3);
        assert_eq!(config.win_conditions().len(), 8);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = GameConfig::from_toml("").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_width_only_generates_lines() {
        let config = GameConfig::from_toml("board_width = 4").unwrap();
        assert_eq!(config.win_conditions().len(), 24);
    }

    #[test]
    fn test_explicit_lines() {
        let config = GameConfig::from_toml(
            "board_width = 3\nwin_conditions = [[0, 4, 8], [2, 4, 6]]",
        )
        .unwrap();
        assert_eq!(
            config.win_conditions(),
            &vec![WinCondition([0, 4, 8]), WinCondition([2, 4, 6])]
        );
    }

    #[test]
    fn test_out_of_bounds_line_rejected() {
        let err = GameConfig::from_toml("board_width = 3\nwin_conditions = [[0, 4, 9]]")
            .unwrap_err();
        assert!(err.message.contains("outside"));
    }

    #[test]
    fn test_repeated_cell_rejected() {
        assert!(GameConfig::new(3, vec![WinCondition([1, 1, 2])]).is_err());
    }

    #[test]
    fn test_small_board_needs_explicit_lines() {
        assert!(GameConfig::standard(2).is_err());
        assert!(GameConfig::standard(0).is_err());
    }

    #[test]
    fn test_oversized_width_rejected_before_line_generation() {
        let err = GameConfig::from_toml("board_width = 9223372036854775807").unwrap_err();
        assert!(err.message.contains("exceeds"));
        assert!(GameConfig::standard(usize::MAX).is_err());
        assert!(GameConfig::new(usize::MAX, vec![WinCondition([0, 1, 2])]).is_err());
    }

    #[test]
    fn test_widest_board_accepted() {
        let config = GameConfig::standard(MAX_BOARD_WIDTH).unwrap();
        assert_eq!(*config.board_width(), MAX_BOARD_WIDTH);
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = GameConfig::from_toml("board_width = \"wide\"").unwrap_err();
        assert!(err.message.contains("parse"));
    }
}
