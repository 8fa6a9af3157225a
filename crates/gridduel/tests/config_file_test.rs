//! Tests for loading board configuration from disk.

use std::io::Write;

use gridduel::{GameConfig, GameManager, WinCondition};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_config_file() {
    let file = write_config("board_width = 5\n");
    let config = GameConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(*config.board_width(), 5);
    assert_eq!(config.win_conditions().len(), 48);
}

#[test]
fn test_missing_file_is_an_error() {
    let err = GameConfig::from_file("/nonexistent/gridduel.toml").unwrap_err();
    assert!(err.message.contains("Failed to read"));
}

#[test]
fn test_sessions_use_configured_lines() {
    let file = write_config("board_width = 3\nwin_conditions = [[0, 4, 8]]\n");
    let config = GameConfig::from_file(file.path()).expect("Load failed");
    let games = GameManager::with_seed(config, 1);

    let session = games.join("alice", "Alice").unwrap();
    assert_eq!(session.win_conditions(), &vec![WinCondition([0, 4, 8])]);
}

#[test]
fn test_single_line_board_draws_once_blocked() {
    let config = GameConfig::new(3, vec![WinCondition([0, 4, 8])]).unwrap();
    let games = GameManager::with_seed(config, 1);
    games.join("alice", "Alice").unwrap();
    let session = games.join("bob", "Bob").unwrap();
    let a = session.turn_holder().unwrap().player_id().clone();
    let b = session.opponent_of(&a).unwrap().player_id().clone();

    games.play(*session.id(), &a, 0).unwrap();
    let session = games.play(*session.id(), &b, 4).unwrap();
    assert!(*session.is_finished());
    assert_eq!(*session.won_by(), None);
}
