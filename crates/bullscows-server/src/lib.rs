//! Bulls and Cows Game Server Library
//!
//! Core functionality for the game server:
//! - SQLite storage for game records
//! - Expiring in-memory attempt ledger
//! - Game lifecycle with per-game write serialization
//! - HTTP routes, validation and error mapping

pub mod clock;
pub mod ledger;
pub mod lifecycle;
pub mod server;
pub mod storage;
