//! Error types for the Bulls and Cows core library.

use thiserror::Error;

use crate::db::DatabaseError;

/// Result type alias using the core `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from configuration loading and process setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures raised by the game lifecycle.
///
/// `GameOver` is special: by the time it is returned the game has already
/// been marked as lost and its attempt ledger cleared.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("The proposal has already been made for this game.")]
    DuplicateProposal,

    #[error("The game with id {0} is already over.")]
    GameAlreadyOver(i64),

    #[error("Sorry timeout. Game Over!")]
    GameOver { secret_number: String },

    #[error("Game {0} not found")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<DatabaseError> for GameError {
    fn from(e: DatabaseError) -> Self {
        Self::Storage(e.to_string())
    }
}
