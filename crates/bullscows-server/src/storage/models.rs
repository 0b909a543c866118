//! Data models for game storage.

use bullscows_core::Standing;
use serde::{Deserialize, Serialize};

/// A persisted game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub secret_number: String,
    pub user: String,
    pub age: i64,
    pub attempts_count: i64,
    pub win: bool,
    pub lose: bool,
    pub evaluation: f64,
    pub expires_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Game {
    /// Won or lost; no further guesses are accepted.
    pub const fn is_over(&self) -> bool {
        self.win || self.lose
    }

    /// Strictly past the deadline at `now`.
    pub const fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Seconds left before the deadline, clamped at zero.
    pub const fn remaining_secs_at(&self, now: i64) -> i64 {
        if now > self.expires_at {
            0
        } else {
            self.expires_at - now
        }
    }
}

/// Parameters for inserting a new game.
#[derive(Debug, Clone)]
pub struct NewGame<'a> {
    pub secret_number: &'a str,
    pub user: &'a str,
    pub age: i64,
    pub expires_at: i64,
}

/// Row shape for ranking queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StandingRow {
    pub id: i64,
    pub win: bool,
    pub evaluation: f64,
}

impl From<StandingRow> for Standing {
    fn from(row: StandingRow) -> Self {
        Self {
            id: row.id,
            win: row.win,
            evaluation: row.evaluation,
        }
    }
}
