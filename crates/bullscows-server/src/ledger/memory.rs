//! In-memory attempt ledger with per-entry expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use bullscows_core::Attempt;

use super::AttemptLedger;
use crate::clock::{Clock, system_clock};

struct Entry {
    attempts: Vec<Attempt>,
    expires_at: i64,
}

/// Thread-safe map of game id to attempt sequence.
///
/// Expired entries are invisible to readers immediately and are dropped
/// from memory by [`InMemoryLedger::sweep_expired`].
#[derive(Clone)]
pub struct InMemoryLedger {
    entries: Arc<RwLock<HashMap<i64, Entry>>>,
    clock: Clock,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Remove expired sequences. Returns the count removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = (self.clock)();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();

        if removed > 0 {
            info!(removed, "Swept expired attempt sequences");
        }
        removed
    }

    /// Run [`Self::sweep_expired`] every `every` until the task is aborted.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let ledger = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // Skip first immediate tick
            loop {
                interval.tick().await;
                let removed = ledger.sweep_expired().await;
                if removed > 0 {
                    let live = ledger.live_count().await;
                    debug!(removed, live, "Ledger sweep completed");
                }
            }
        })
    }

    /// Number of live (non-expired) sequences.
    pub async fn live_count(&self) -> usize {
        let now = (self.clock)();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptLedger for InMemoryLedger {
    async fn append(&self, game_id: i64, attempt: Attempt, ttl_secs: i64) {
        let now = (self.clock)();
        let mut entries = self.entries.write().await;

        let mut attempts = match entries.remove(&game_id) {
            Some(entry) if entry.expires_at > now => entry.attempts,
            _ => Vec::new(),
        };
        attempts.push(attempt);

        debug!(game_id, count = attempts.len(), ttl_secs, "Attempt recorded");
        entries.insert(
            game_id,
            Entry {
                attempts,
                expires_at: now.saturating_add(ttl_secs),
            },
        );
    }

    async fn list(&self, game_id: i64) -> Vec<Attempt> {
        let now = (self.clock)();
        self.entries
            .read()
            .await
            .get(&game_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.attempts.clone())
            .unwrap_or_default()
    }

    async fn clear(&self, game_id: i64) {
        if self.entries.write().await.remove(&game_id).is_some() {
            debug!(game_id, "Attempt sequence cleared");
        }
    }
}
