//! HTTP routes for the game API.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bullscows_core::AttemptReport;
use bullscows_core::config::RateLimitConfig;

use super::error::ApiError;
use super::rate_limit::{self, RateLimiter};
use super::validation::{self, ValidationError};
use crate::clock::Clock;
use crate::ledger::AttemptLedger;
use crate::lifecycle::GameService;

/// Shared application state.
pub struct AppState<L> {
    pub games: GameService<L>,
    pub create_limiter: RateLimiter,
    pub attempt_limiter: RateLimiter,
}

impl<L> AppState<L> {
    pub fn new(games: GameService<L>, limits: &RateLimitConfig, clock: &Clock) -> Self {
        Self {
            games,
            create_limiter: RateLimiter::per_minute(
                "create_game",
                limits.create_per_minute,
                Arc::clone(clock),
            ),
            attempt_limiter: RateLimiter::per_minute(
                "add_attempt",
                limits.attempt_per_minute,
                Arc::clone(clock),
            ),
        }
    }
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            games: self.games.clone(),
            create_limiter: self.create_limiter.clone(),
            attempt_limiter: self.attempt_limiter.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameCreated {
    #[serde(rename = "gameId")]
    pub game_id: i64,
}

/// Build the router. Game routes are served both at the root and under
/// `/api`, sharing one limiter per route across both prefixes.
pub fn build_router<L: AttemptLedger>(state: AppState<L>) -> Router {
    let router = Router::new().route("/health", get(health));
    let router = mount_game_routes(router, "", &state);
    let router = mount_game_routes(router, "/api", &state);

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn mount_game_routes<L: AttemptLedger>(
    router: Router<AppState<L>>,
    prefix: &str,
    state: &AppState<L>,
) -> Router<AppState<L>> {
    let create_limit =
        middleware::from_fn_with_state(state.create_limiter.clone(), rate_limit::enforce);
    let attempt_limit =
        middleware::from_fn_with_state(state.attempt_limiter.clone(), rate_limit::enforce);

    router
        .route(
            &format!("{prefix}/game"),
            post(create_game::<L>).layer(create_limit),
        )
        .route(
            &format!("{prefix}/game/{{id}}/attempt"),
            post(add_attempt::<L>).layer(attempt_limit),
        )
        .route(&format!("{prefix}/game/{{id}}"), delete(delete_game::<L>))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `POST /game`: start a game for `{user, age}`.
pub async fn create_game<L: AttemptLedger>(
    State(state): State<AppState<L>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<GameCreated>), ApiError> {
    let body = json_body(body)?;
    let req = validation::new_game(&body)?;
    let game_id = state.games.create_game(&req.user, req.age).await?;
    Ok((StatusCode::CREATED, Json(GameCreated { game_id })))
}

/// `POST /game/{id}/attempt`: score a `{proposal}`.
pub async fn add_attempt<L: AttemptLedger>(
    game_id: Result<Path<i64>, PathRejection>,
    State(state): State<AppState<L>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AttemptReport>, ApiError> {
    let game_id = path_id(game_id)?;
    let body = json_body(body)?;
    let proposal = validation::proposal(&body)?;
    let attempt = state.games.add_attempt(game_id, &proposal).await?;
    Ok(Json(attempt.report()))
}

/// `DELETE /game/{id}`: remove a game, answering with its latest attempt
/// or `null`.
pub async fn delete_game<L: AttemptLedger>(
    game_id: Result<Path<i64>, PathRejection>,
    State(state): State<AppState<L>>,
) -> Result<Json<Option<AttemptReport>>, ApiError> {
    let game_id = path_id(game_id)?;
    let latest = state.games.delete_game(game_id).await?;
    Ok(Json(latest.as_ref().map(bullscows_core::Attempt::report)))
}

fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::InvalidGameId(rejection.body_text()))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ValidationError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ValidationError::field("body", rejection.body_text())),
    }
}
