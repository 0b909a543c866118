//! Per-game attempt ledger.
//!
//! Attempts are short-lived: each game's sequence expires together with the
//! game's remaining play time, and absent or expired sequences read as empty.

mod memory;

use std::future::Future;

use bullscows_core::Attempt;

pub use memory::InMemoryLedger;

/// TTL-keyed store of attempt sequences, one per game.
pub trait AttemptLedger: Send + Sync + 'static {
    /// Append `attempt` to the game's sequence and reset its expiry to
    /// `ttl_secs` from now.
    fn append(
        &self,
        game_id: i64,
        attempt: Attempt,
        ttl_secs: i64,
    ) -> impl Future<Output = ()> + Send;

    /// Attempts in insertion order; empty when absent or expired.
    fn list(&self, game_id: i64) -> impl Future<Output = Vec<Attempt>> + Send;

    /// Drop the game's sequence regardless of its remaining time.
    fn clear(&self, game_id: i64) -> impl Future<Output = ()> + Send;
}
