//! Tracing/logging initialization for the game server.
//!
//! Sets up `tracing_subscriber` with an env-filter and optional JSON output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- directives used when `RUST_LOG` is unset or invalid
///   (e.g. `"bullscows_server=info,tower_http=info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
///
/// Fails if a global subscriber has already been installed.
pub fn init_tracing(default_filter: &str, log_json: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    installed.map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}
