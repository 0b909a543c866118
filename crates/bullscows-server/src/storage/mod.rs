//! SQLite storage for the Bulls and Cows server.
//!
//! Provides persistence for game records. Attempts are not stored here; see
//! [`crate::ledger`].

mod db;
mod models;
mod queries;


pub use db::{DatabaseError, GameDatabase};
pub use models::*;
