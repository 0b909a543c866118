//! Game state machine and its per-game write serialization.

mod locks;
mod service;


pub use locks::{GameGuard, GameLocks};
pub use service::{GameService, evaluation};
