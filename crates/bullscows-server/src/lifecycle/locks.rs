//! Per-game write serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

type SlotMap = HashMap<i64, Slot>;

struct Slot {
    lock: Arc<Mutex<()>>,
    /// Holders plus callers queued on `lock`.
    users: usize,
}

/// Hands out one async mutex per game id so that the read-check-write
/// sequence of a guess or a delete runs single-writer per game.
#[derive(Clone, Default)]
pub struct GameLocks {
    slots: Arc<StdMutex<SlotMap>>,
}

/// Exclusive access to one game, released on drop.
pub struct GameGuard {
    _guard: OwnedMutexGuard<()>,
    _claim: Claim,
}

/// One caller's interest in a slot. Dropping it, whether after the lock was
/// held or while still queued, frees the slot once nobody else uses it.
struct Claim {
    game_id: i64,
    slots: Arc<StdMutex<SlotMap>>,
}

impl GameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other caller holds `game_id`.
    pub async fn acquire(&self, game_id: i64) -> GameGuard {
        let (claim, lock) = self.claim(game_id);
        let guard = lock.lock_owned().await;
        GameGuard {
            _guard: guard,
            _claim: claim,
        }
    }

    /// Number of games with a live lock slot.
    pub fn tracked(&self) -> usize {
        lock_slots(&self.slots).len()
    }

    fn claim(&self, game_id: i64) -> (Claim, Arc<Mutex<()>>) {
        let mut slots = lock_slots(&self.slots);
        let slot = slots.entry(game_id).or_insert_with(|| Slot {
            lock: Arc::new(Mutex::new(())),
            users: 0,
        });
        slot.users += 1;
        let lock = Arc::clone(&slot.lock);
        (
            Claim {
                game_id,
                slots: Arc::clone(&self.slots),
            },
            lock,
        )
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut slots = lock_slots(&self.slots);
        if let Some(slot) = slots.get_mut(&self.game_id) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                slots.remove(&self.game_id);
            }
        }
    }
}

// The map is only touched in short non-panicking sections.
fn lock_slots(slots: &StdMutex<SlotMap>) -> MutexGuard<'_, SlotMap> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}
