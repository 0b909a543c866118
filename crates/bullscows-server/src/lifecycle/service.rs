//! Game lifecycle: creation, guesses, and deletion.
//!
//! A game is `Active` until a guess matches the secret (`Won`), a guess
//! arrives after its deadline (`Lost`), or it is deleted.

use std::sync::Arc;

use tracing::{info, warn};

use bullscows_core::{Attempt, GameError, ranking, score, secret};

use super::locks::GameLocks;
use crate::clock::{Clock, system_clock};
use crate::ledger::AttemptLedger;
use crate::storage::{DatabaseError, Game, GameDatabase, NewGame};

/// Orchestrates the game state machine over the record store and the
/// attempt ledger.
pub struct GameService<L> {
    db: GameDatabase,
    ledger: Arc<L>,
    locks: GameLocks,
    clock: Clock,
    max_active_secs: i64,
}

impl<L> Clone for GameService<L> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            ledger: Arc::clone(&self.ledger),
            locks: self.locks.clone(),
            clock: Arc::clone(&self.clock),
            max_active_secs: self.max_active_secs,
        }
    }
}

impl<L: AttemptLedger> GameService<L> {
    pub fn new(db: GameDatabase, ledger: Arc<L>, max_active_secs: i64) -> Self {
        Self::with_clock(db, ledger, max_active_secs, system_clock())
    }

    pub fn with_clock(db: GameDatabase, ledger: Arc<L>, max_active_secs: i64, clock: Clock) -> Self {
        Self {
            db,
            ledger,
            locks: GameLocks::new(),
            clock,
            max_active_secs,
        }
    }

    pub const fn database(&self) -> &GameDatabase {
        &self.db
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Start a new game with a fresh secret. Returns its id.
    pub async fn create_game(&self, user: &str, age: i64) -> Result<i64, GameError> {
        let secret_number = secret::generate();
        let expires_at = (self.clock)().saturating_add(self.max_active_secs);

        let game = self
            .db
            .create_game(&NewGame {
                secret_number: &secret_number,
                user,
                age,
                expires_at,
            })
            .await?;

        info!(game_id = game.id, expires_at, "Game created");
        Ok(game.id)
    }

    /// Score `proposal` against the game's secret and record it.
    ///
    /// A guess on an expired game marks it lost and clears its attempts
    /// before `GameError::GameOver` is returned.
    pub async fn add_attempt(&self, game_id: i64, proposal: &str) -> Result<Attempt, GameError> {
        let _guard = self.locks.acquire(game_id).await;
        self.apply_attempt(game_id, proposal).await
    }

    /// Delete a game and return its most recent attempt, if any.
    pub async fn delete_game(&self, game_id: i64) -> Result<Option<Attempt>, GameError> {
        let _guard = self.locks.acquire(game_id).await;
        self.remove_game(game_id).await
    }

    /// 1-based rank of `game` among all stored games.
    pub async fn rank(&self, game: &Game) -> Result<u32, GameError> {
        let standings = self.db.list_standings().await?;
        Ok(ranking::rank(&standings, game.id))
    }

    async fn apply_attempt(&self, game_id: i64, proposal: &str) -> Result<Attempt, GameError> {
        let previous = self.ledger.list(game_id).await;
        if previous.iter().any(|a| a.proposal == proposal) {
            return Err(GameError::DuplicateProposal);
        }

        let mut game = self.load(game_id).await?;
        if game.is_over() {
            return Err(GameError::GameAlreadyOver(game_id));
        }

        let now = (self.clock)();
        let remaining = game.expires_at - now;

        if game.is_expired_at(now) {
            self.db.mark_lost(game_id).await?;
            self.ledger.clear(game_id).await;
            warn!(game_id, overdue_secs = -remaining, "Game expired, marked as lost");
            return Err(GameError::GameOver {
                secret_number: game.secret_number,
            });
        }

        if proposal == game.secret_number {
            game.win = true;
        }
        game.attempts_count += 1;
        game.evaluation = evaluation(game.remaining_secs_at(now), game.attempts_count);
        self.db.save_progress(&game).await?;

        let ranking = self.rank(&game).await?;
        let attempts = u32::try_from(game.attempts_count).unwrap_or(u32::MAX);
        let attempt = Attempt {
            attempt_id: attempts,
            proposal: proposal.to_string(),
            bulls: score::bulls(&game.secret_number, proposal),
            cows: score::cows(&game.secret_number, proposal),
            attempts,
            evaluation: game.evaluation,
            ranking,
        };

        self.ledger.append(game_id, attempt.clone(), remaining).await;

        if game.win {
            info!(game_id, attempts, ranking, "Game won");
        } else {
            info!(
                game_id,
                attempts,
                bulls = attempt.bulls.count,
                cows = attempt.cows.count,
                "Attempt recorded"
            );
        }
        Ok(attempt)
    }

    async fn remove_game(&self, game_id: i64) -> Result<Option<Attempt>, GameError> {
        self.load(game_id).await?;
        self.db.delete_game(game_id).await?;

        let latest = self
            .ledger
            .list(game_id)
            .await
            .into_iter()
            .max_by_key(|a| a.attempt_id);
        self.ledger.clear(game_id).await;

        info!(
            game_id,
            latest_attempt = latest.as_ref().map(|a| a.attempt_id),
            "Game deleted"
        );
        Ok(latest)
    }

    async fn load(&self, game_id: i64) -> Result<Game, GameError> {
        self.db.get_game(game_id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => GameError::NotFound(game_id),
            other => other.into(),
        })
    }
}

/// Score of a game after an attempt: half the seconds left plus the number
/// of attempts made. Lower is better.
#[allow(clippy::cast_precision_loss)]
pub fn evaluation(remaining_secs: i64, attempts_count: i64) -> f64 {
    remaining_secs.max(0) as f64 / 2.0 + attempts_count as f64
}
