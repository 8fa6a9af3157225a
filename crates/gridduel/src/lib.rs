//! Gridduel - session engine for a two-player grid game.
//!
//! Generalised tic-tac-toe on an N-width board with a configurable set of
//! winning lines. The crate owns the game state; a transport layer calls
//! in with validated primitives and broadcasts the returned snapshots.
//!
//! # Architecture
//!
//! - **Store**: per-session locked map of immutable session snapshots
//! - **Matchmaking**: seats players and draws roles once a session is full
//! - **Engine**: validates and applies moves
//! - **Win evaluation**: pure board evaluation with incremental line pruning
//! - **Rematch**: consent tracking, reset and resignation
//!
//! # Example
//!
//! ```
//! use gridduel::{GameConfig, GameManager};
//!
//! # fn example() -> Result<(), gridduel::GameError> {
//! let games = GameManager::with_seed(GameConfig::default(), 7);
//! games.join("alice", "Alice")?;
//! let session = games.join("bob", "Bob")?;
//!
//! let first = session.turn_holder().unwrap().player_id().clone();
//! let session = games.play(*session.id(), &first, 4)?;
//! assert!(!*session.is_finished());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod config;
mod engine;
mod error;
mod invariants;
mod manager;
mod rematch;
mod roles;
mod session;
mod store;
mod win;

// Crate-level exports - Board types
pub use board::{Board, Cell, Mark, Occupant};

// Crate-level exports - Configuration
pub use config::{GameConfig, MAX_BOARD_WIDTH};

// Crate-level exports - Errors
pub use error::{ConfigError, GameError, GameErrorKind, MoveRejection, StateRejection};

// Crate-level exports - Invariants
pub use invariants::{
    DistinctMarksInvariant, Invariant, InvariantSet, InvariantViolation, OutcomeInvariant,
    PlayerLimitInvariant, SessionInvariants, SingleTurnInvariant,
};

// Crate-level exports - Operations
pub use engine::apply_move;
pub use manager::GameManager;
pub use rematch::{consent_complete, request_rematch, reset_session, resign_session};
pub use roles::{Roles, assign_roles};

// Crate-level exports - Session state
pub use session::{GameSession, PLAYER_LIMIT, Player, PlayerId, SessionId};
pub use store::SessionStore;

// Crate-level exports - Win evaluation
pub use win::{Evaluation, Outcome, WinCondition, evaluate, standard_lines};
