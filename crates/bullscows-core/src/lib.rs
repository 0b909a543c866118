//! Bulls and Cows Core Library
//!
//! Shared functionality for the game server:
//! - Secret generation and bulls/cows scoring
//! - Attempt records and cross-game ranking
//! - Configuration resolution
//! - Common error types, `SQLite` helpers and tracing setup

pub mod attempt;
pub mod config;
pub mod db;
pub mod error;
pub mod ranking;
pub mod score;
pub mod secret;
pub mod tracing_init;

pub use attempt::{Attempt, AttemptReport};
pub use config::Config;
pub use error::{Error, GameError, Result};
pub use ranking::Standing;
pub use score::Score;
