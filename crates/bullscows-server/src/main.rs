//! Bulls and Cows Game Server
//!
//! HTTP API for creating games, scoring guesses and deleting games.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use bullscows_core::config;
use bullscows_core::tracing_init::init_tracing;
use bullscows_server::clock::system_clock;
use bullscows_server::ledger::InMemoryLedger;
use bullscows_server::lifecycle::GameService;
use bullscows_server::server::{AppState, build_router};
use bullscows_server::storage::GameDatabase;

#[derive(Parser, Debug)]
#[command(name = "bullscows-server")]
#[command(version, about = "Bulls and Cows game server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080", env = "LISTEN_ADDR")]
    addr: SocketAddr,

    /// Path to SQLite database file.
    #[arg(long, env = "DB_PATH")]
    db_path: Option<PathBuf>,

    /// Settings file. Defaults to the global settings file if present.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seconds a new game stays playable. Overrides the settings file and
    /// `MAX_GAME_ACTIVE_TIME`.
    #[arg(long)]
    max_active_secs: Option<i64>,

    /// Seconds between sweeps of expired attempt ledgers. Overrides the
    /// settings file and `BULLSCOWS_LEDGER_SWEEP_SECS`.
    #[arg(long)]
    ledger_sweep_secs: Option<u64>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("bullscows_server=info,tower_http=info", args.log_json)?;

    let mut cfg = config::load_config(args.settings.as_deref())?;
    if let Some(secs) = args.max_active_secs {
        cfg.game.max_active_secs = secs;
    }
    if let Some(secs) = args.ledger_sweep_secs {
        cfg.game.ledger_sweep_secs = secs;
    }
    config::validate(&cfg)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        max_active_secs = cfg.game.max_active_secs,
        "Starting bullscows-server"
    );
    info!(
        create_per_minute = cfg.rate_limits.create_per_minute,
        attempt_per_minute = cfg.rate_limits.attempt_per_minute,
        "Client rate limits per minute"
    );

    let db_path = match args.db_path {
        Some(path) => path,
        None => config::database_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?,
    };
    info!(path = %db_path.display(), "Opening game database");
    let db = GameDatabase::open(&db_path).await?;
    let winners = db.count_winning_games().await?;
    info!(winners, "Game database ready");

    let clock = system_clock();
    let ledger = Arc::new(InMemoryLedger::with_clock(Arc::clone(&clock)));
    let games = GameService::with_clock(
        db,
        Arc::clone(&ledger),
        cfg.game.max_active_secs,
        Arc::clone(&clock),
    );

    // Expired sequences are already invisible to readers; this frees memory.
    let sweeper = ledger.spawn_sweeper(Duration::from_secs(cfg.game.ledger_sweep_secs));

    let app = build_router(AppState::new(games, &cfg.rate_limits, &clock));
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, "Game server listening");

    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, service)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    sweeper.abort();
    info!("Game server stopped");
    Ok(())
}
