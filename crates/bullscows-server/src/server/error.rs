//! Mapping of game and validation failures onto HTTP responses.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::error;

use bullscows_core::GameError;

use super::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Game(#[from] GameError),

    /// A path id that is not an integer names no game.
    #[error("Invalid game id {0:?}")]
    InvalidGameId(String),

    #[error("Too Many Attempts.")]
    RateLimited { retry_after_secs: u64 },
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidGameId(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Game(GameError::DuplicateProposal) => StatusCode::PRECONDITION_FAILED,
            Self::Game(GameError::GameAlreadyOver(_)) => StatusCode::GONE,
            Self::Game(GameError::GameOver { .. }) => StatusCode::REQUEST_TIMEOUT,
            Self::Game(GameError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Game(GameError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(err) => json!({ "errors": err.errors }),
            Self::InvalidGameId(_) => json!({ "error": NOT_FOUND_MESSAGE }),
            Self::RateLimited { .. } => json!({ "errors": self.to_string() }),
            Self::Game(err) => match err {
                GameError::GameOver { secret_number } => json!({
                    "error": err.to_string(),
                    "secret_number": secret_json(secret_number),
                }),
                GameError::NotFound(_) => json!({ "error": NOT_FOUND_MESSAGE }),
                GameError::Storage(_) => json!({ "errors": "Internal server error" }),
                GameError::DuplicateProposal | GameError::GameAlreadyOver(_) => {
                    json!({ "errors": err.to_string() })
                }
            },
        }
    }
}

const NOT_FOUND_MESSAGE: &str = "Element not found";

/// The secret is published as a number; it never has a leading zero.
fn secret_json(secret: &str) -> Value {
    secret
        .parse::<u32>()
        .map_or_else(|_| Value::from(secret), Value::from)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Game(GameError::Storage(ref msg)) = self {
            error!(error = %msg, "Request failed on storage");
        }
        let mut response = (self.status(), Json(self.body())).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, retry_after_secs.into());
        }
        response
    }
}
