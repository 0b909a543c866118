//! Per-client request limits.
//!
//! Each limiter counts requests per client key in fixed one-minute windows.
//! The key is the peer IP when the server runs with connect info, otherwise
//! the first `X-Forwarded-For` hop.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::error::ApiError;
use crate::clock::Clock;

const WINDOW_SECS: i64 = 60;
const ANONYMOUS: &str = "anonymous";

struct Window {
    started_at: i64,
    hits: u32,
}

#[derive(Default)]
struct Windows {
    by_client: HashMap<String, Window>,
    pruned_at: i64,
}

/// Fixed-window counter keyed by client.
#[derive(Clone)]
pub struct RateLimiter {
    name: &'static str,
    per_minute: u32,
    clock: Clock,
    windows: Arc<Mutex<Windows>>,
}

impl RateLimiter {
    pub fn per_minute(name: &'static str, per_minute: u32, clock: Clock) -> Self {
        Self {
            name,
            per_minute,
            clock,
            windows: Arc::new(Mutex::new(Windows::default())),
        }
    }

    /// Count one request from `client`. Over the limit, returns the seconds
    /// until its window resets.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let now = (self.clock)();
        let mut windows = self.lock();

        if now - windows.pruned_at >= WINDOW_SECS {
            windows
                .by_client
                .retain(|_, w| now - w.started_at < WINDOW_SECS);
            windows.pruned_at = now;
        }

        let window = windows
            .by_client
            .entry(client.to_string())
            .or_insert(Window {
                started_at: now,
                hits: 0,
            });
        if now - window.started_at >= WINDOW_SECS {
            *window = Window {
                started_at: now,
                hits: 0,
            };
        }

        if window.hits >= self.per_minute {
            let retry_after = window.started_at + WINDOW_SECS - now;
            return Err(u64::try_from(retry_after).unwrap_or(1).max(1));
        }
        window.hits += 1;
        Ok(())
    }

    /// Number of clients with an open window.
    pub fn tracked(&self) -> usize {
        self.lock().by_client.len()
    }

    fn lock(&self) -> MutexGuard<'_, Windows> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Middleware rejecting requests over the limit with 429.
pub async fn enforce(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    match limiter.check(&client) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            warn!(
                limiter = limiter.name,
                client = %client,
                retry_after_secs,
                "Rate limit exceeded"
            );
            ApiError::RateLimited { retry_after_secs }.into_response()
        }
    }
}

fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}
