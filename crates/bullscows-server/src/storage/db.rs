//! SQLite database for game records.

pub use bullscows_core::db::DatabaseError;

bullscows_core::define_database!(GameDatabase, "Game database migrations complete");
