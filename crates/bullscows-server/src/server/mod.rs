//! HTTP surface of the game server.

pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod validation;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use routes::{AppState, build_router};
pub use validation::ValidationError;
