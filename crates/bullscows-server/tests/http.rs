#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use bullscows_core::config::RateLimitConfig;
use bullscows_server::clock::ManualClock;
use bullscows_server::ledger::InMemoryLedger;
use bullscows_server::lifecycle::GameService;
use bullscows_server::server::{AppState, build_router};
use bullscows_server::storage::GameDatabase;

const MAX_ACTIVE: i64 = 600;

struct TestApp {
    router: axum::Router,
    games: GameService<InMemoryLedger>,
    clock: ManualClock,
}

impl TestApp {
    async fn new() -> Self {
        let clock = ManualClock::new(1_800_000_000);
        let db = GameDatabase::open_in_memory().await.unwrap();
        let ledger = Arc::new(InMemoryLedger::with_clock(clock.clock()));
        let games = GameService::with_clock(db, ledger, MAX_ACTIVE, clock.clock());
        let router = build_router(AppState::new(
            games.clone(),
            &RateLimitConfig::default(),
            &clock.clock(),
        ));
        Self {
            router,
            games,
            clock,
        }
    }

    /// Send a request and return (status, parsed JSON body).
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(None, method, uri, body).await
    }

    /// Like `send`, identifying the client through `X-Forwarded-For`.
    async fn send_as(
        &self,
        client: Option<&str>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(client) = client {
            builder = builder.header("x-forwarded-for", client);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_as(&self, client: &str) -> StatusCode {
        self.send_as(
            Some(client),
            "POST",
            "/game",
            Some(json!({"user": client, "age": 30})),
        )
        .await
        .0
    }

    async fn create(&self) -> i64 {
        let (status, body) = self
            .send("POST", "/game", Some(json!({"user": "alice", "age": 30})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["gameId"].as_i64().unwrap()
    }

    async fn guess(&self, id: i64, proposal: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/game/{id}/attempt"),
            Some(json!({ "proposal": proposal })),
        )
        .await
    }

    async fn guess_raw(&self, id: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/game/{id}/attempt"),
            Some(json!({ "proposal": "1234" })),
        )
        .await
    }

    async fn secret(&self, id: i64) -> String {
        self.games
            .database()
            .get_game(id)
            .await
            .unwrap()
            .secret_number
    }
}

/// A valid proposal that differs from `secret`.
fn wrong_guess(secret: &str, nth: usize) -> String {
    ["1234", "5678", "9012", "3456"]
        .iter()
        .filter(|c| **c != secret)
        .nth(nth)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn create_game_returns_id() {
    let app = TestApp::new().await;
    let first = app.create().await;
    let second = app.create().await;
    assert!(second > first);
}

#[tokio::test]
async fn create_game_validates_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send("POST", "/game", Some(json!({"user": "bob", "age": 0})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"errors": {"age": ["The age must be greater than 0."]}})
    );

    let (status, body) = app.send("POST", "/game", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["user"].is_array());
    assert!(body["errors"]["age"].is_array());
}

#[tokio::test]
async fn malformed_body_is_unprocessable() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/game")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn attempt_returns_report() {
    let app = TestApp::new().await;
    let id = app.create().await;
    let guess = wrong_guess(&app.secret(id).await, 0);

    let (status, body) = app.guess(id, &guess).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attemptId"], 1);
    assert_eq!(body["proposal"], guess.as_str());
    assert_eq!(body["attemps"], 1);
    assert_eq!(body["win"], false);
    assert_eq!(body["ranking"], 1);
    assert_eq!(body["evaluation"], 301.0);
    assert!(body["result"].as_str().unwrap().starts_with("There are "));
}

#[tokio::test]
async fn winning_attempt_congratulates() {
    let app = TestApp::new().await;
    let id = app.create().await;
    let secret = app.secret(id).await;

    let (status, body) = app.guess(id, &secret).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["win"], true);
    assert_eq!(
        body["result"],
        "Congratulations! You guessed the secret number."
    );

    let (status, body) = app.guess(id, &wrong_guess(&secret, 0)).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(
        body["errors"],
        format!("The game with id {id} is already over.")
    );
}

#[tokio::test]
async fn invalid_proposal_is_unprocessable() {
    let app = TestApp::new().await;
    let id = app.create().await;

    let (status, body) = app.guess(id, "1123").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["proposal"],
        json!(["The proposal should not have repeated characters."])
    );

    let (status, _) = app.guess(id, "12345").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_proposal_is_precondition_failed() {
    let app = TestApp::new().await;
    let id = app.create().await;
    let guess = wrong_guess(&app.secret(id).await, 0);

    app.guess(id, &guess).await;
    let (status, body) = app.guess(id, &guess).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        body["errors"],
        "The proposal has already been made for this game."
    );
}

#[tokio::test]
async fn expired_game_times_out_with_secret() {
    let app = TestApp::new().await;
    let id = app.create().await;
    let secret = app.secret(id).await;

    app.clock.advance(MAX_ACTIVE + 1);
    let (status, body) = app.guess(id, &wrong_guess(&secret, 0)).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"], "Sorry timeout. Game Over!");
    assert_eq!(body["secret_number"], secret.parse::<u32>().unwrap());

    let (status, _) = app.guess(id, &wrong_guess(&secret, 1)).await;
    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.guess(999, "1234").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Element not found"}));

    let (status, _) = app.send("DELETE", "/game/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_latest_attempt_or_null() {
    let app = TestApp::new().await;

    let empty = app.create().await;
    let (status, body) = app.send("DELETE", &format!("/game/{empty}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let id = app.create().await;
    let secret = app.secret(id).await;
    app.guess(id, &wrong_guess(&secret, 0)).await;
    app.guess(id, &wrong_guess(&secret, 1)).await;

    let (status, body) = app.send("DELETE", &format!("/game/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attemptId"], 2);
    assert_eq!(body["proposal"], wrong_guess(&secret, 1).as_str());

    let (status, _) = app.send("DELETE", &format!("/game/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_prefix_serves_same_routes() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send("POST", "/api/game", Some(json!({"user": "carol", "age": 41})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["gameId"].as_i64().unwrap();

    let secret = app.secret(id).await;
    let (status, body) = app
        .send(
            "POST",
            &format!("/api/game/{id}/attempt"),
            Some(json!({ "proposal": secret })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["win"], true);

    let (status, _) = app.send("DELETE", &format!("/api/game/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_integer_id_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.guess_raw("abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Element not found"}));

    let (status, body) = app.send("DELETE", "/game/1.5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Element not found"}));
}

#[tokio::test]
async fn create_is_limited_per_client() {
    let app = TestApp::new().await;
    let limit = RateLimitConfig::default().create_per_minute;

    for _ in 0..limit {
        assert_eq!(app.create_as("10.0.0.1").await, StatusCode::CREATED);
    }

    let (status, body) = app
        .send_as(
            Some("10.0.0.1"),
            "POST",
            "/api/game",
            Some(json!({"user": "x", "age": 30})),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"errors": "Too Many Attempts."}));

    // Other clients keep their own budget.
    assert_eq!(app.create_as("10.0.0.2").await, StatusCode::CREATED);

    app.clock.advance(60);
    assert_eq!(app.create_as("10.0.0.1").await, StatusCode::CREATED);
}

#[tokio::test]
async fn attempts_are_limited_per_client() {
    let app = TestApp::new().await;
    let id = app.create().await;
    let limit = RateLimitConfig::default().attempt_per_minute;

    // Rejected proposals still count towards the limit.
    for _ in 0..limit {
        let (status, _) = app.guess(id, "1123").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
    let (status, _) = app.guess(id, "1123").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
