//! Database queries for game records.

use bullscows_core::Standing;
use bullscows_core::db::unix_timestamp;

use super::db::{DatabaseError, GameDatabase};
use super::models::{Game, NewGame, StandingRow};

impl GameDatabase {
    // =========================================================================
    // Game queries
    // =========================================================================

    /// Insert a new game with zeroed progress.
    pub async fn create_game(&self, game: &NewGame<'_>) -> Result<Game, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO games (secret_number, user, age, attempts_count, win, lose, evaluation, expires_at, created_at, updated_at) VALUES (?, ?, ?, 0, 0, 0, 0, ?, ?, ?)",
        )
        .bind(game.secret_number)
        .bind(game.user)
        .bind(game.age)
        .bind(game.expires_at)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_game(result.last_insert_rowid()).await
    }

    /// Get a game by ID.
    pub async fn get_game(&self, id: i64) -> Result<Game, DatabaseError> {
        sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Game {id}")))
    }

    /// Persist the progress fields of a game after an accepted attempt.
    pub async fn save_progress(&self, game: &Game) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE games SET attempts_count = ?, win = ?, lose = ?, evaluation = ?, updated_at = ? WHERE id = ?",
        )
        .bind(game.attempts_count)
        .bind(game.win)
        .bind(game.lose)
        .bind(game.evaluation)
        .bind(now)
        .bind(game.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Game {}", game.id)));
        }
        Ok(())
    }

    /// Mark a game as lost.
    pub async fn mark_lost(&self, id: i64) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query("UPDATE games SET lose = 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Game {id}")));
        }
        Ok(())
    }

    /// Remove a game.
    pub async fn delete_game(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Ranking queries
    // =========================================================================

    /// Count games that have been won.
    pub async fn count_winning_games(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM games WHERE win = 1")
            .fetch_one(self.pool())
            .await?;

        Ok(row.0)
    }

    /// Ranking inputs for every game, winners first, then by evaluation and age.
    pub async fn list_standings(&self) -> Result<Vec<Standing>, DatabaseError> {
        let rows = sqlx::query_as::<_, StandingRow>(
            "SELECT id, win, evaluation FROM games ORDER BY win DESC, evaluation ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Standing::from).collect())
    }
}
