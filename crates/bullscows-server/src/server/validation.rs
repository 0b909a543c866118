//! Request body validation.
//!
//! Bodies arrive as loose JSON so every field problem can be reported at
//! once, keyed by field name.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use bullscows_core::secret::{DIGITS, has_distinct_digits};

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 150;

/// Per-field validation messages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("The given data was invalid.")]
pub struct ValidationError {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.add(field, message);
        err
    }

    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// A validated request to start a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameRequest {
    pub user: String,
    pub age: i64,
}

pub fn new_game(body: &Value) -> Result<NewGameRequest, ValidationError> {
    let mut err = ValidationError::default();

    let user = match body.get("user") {
        None | Some(Value::Null) => {
            err.add("user", "The user field is required.");
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            err.add("user", "The user field is required.");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            err.add("user", "The user must be a string.");
            None
        }
    };

    let age = match body.get("age") {
        None | Some(Value::Null) => {
            err.add("age", "The age field is required.");
            None
        }
        Some(v) => match integer(v) {
            Some(age) if age < MIN_AGE => {
                err.add("age", "The age must be greater than 0.");
                None
            }
            Some(age) if age > MAX_AGE => {
                err.add("age", "The age must be lesser than 150.");
                None
            }
            Some(age) => Some(age),
            None => {
                err.add("age", "The age must be an integer.");
                None
            }
        },
    };

    match (user, age) {
        (Some(user), Some(age)) => err.into_result(NewGameRequest { user, age }),
        _ => Err(err),
    }
}

/// Validate a guess: exactly four ASCII digits, none repeated.
pub fn proposal(body: &Value) -> Result<String, ValidationError> {
    const FIELD: &str = "proposal";

    let value = match body.get(FIELD) {
        None | Some(Value::Null) => {
            return Err(ValidationError::field(FIELD, "The proposal field is required."));
        }
        Some(Value::String(s)) if s.is_empty() => {
            return Err(ValidationError::field(FIELD, "The proposal field is required."));
        }
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(ValidationError::field(FIELD, "The proposal must be a string."));
        }
    };

    let mut err = ValidationError::default();
    if value.chars().count() != DIGITS {
        err.add(FIELD, format!("The proposal must be {DIGITS} characters."));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        err.add(FIELD, "The proposal format is invalid.");
    }
    if !has_distinct_digits(value) {
        err.add(FIELD, "The proposal should not have repeated characters.");
    }
    err.into_result(value.clone())
}

/// Integers, or numeric strings, as form validators accept them.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
