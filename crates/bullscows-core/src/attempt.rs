//! Attempt records and their client-facing summary.

use serde::{Deserialize, Serialize};

use crate::score::Score;
use crate::secret::DIGITS;

const WIN_MESSAGE: &str = "Congratulations! You guessed the secret number.";

/// One scored guess, as kept in a game's attempt ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Sequence number: the game's attempt count once this guess was counted.
    pub attempt_id: u32,
    pub proposal: String,
    pub bulls: Score,
    pub cows: Score,
    pub attempts: u32,
    pub evaluation: f64,
    pub ranking: u32,
}

impl Attempt {
    /// All digits in place.
    pub fn is_win(&self) -> bool {
        self.bulls.count as usize == DIGITS
    }

    /// Human-readable feedback for this attempt.
    pub fn result_message(&self) -> String {
        if self.is_win() {
            return WIN_MESSAGE.to_string();
        }

        let bulls = if self.bulls.count > 0 {
            format!("The bulls are {}", join_chars(&self.bulls.characters))
        } else {
            "No bulls.".to_string()
        };
        let cows = if self.cows.count > 0 {
            format!("The cows are {}", join_chars(&self.cows.characters))
        } else {
            "No cows.".to_string()
        };

        format!(
            "There are {} bulls and {} cows. \n{bulls}\n{cows}",
            self.bulls.count, self.cows.count
        )
    }

    pub fn report(&self) -> AttemptReport {
        AttemptReport {
            attempt_id: self.attempt_id,
            proposal: self.proposal.clone(),
            result: self.result_message(),
            attempts: self.attempts,
            evaluation: self.evaluation,
            ranking: self.ranking,
            win: self.is_win(),
        }
    }
}

/// Wire shape of an attempt returned to HTTP clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    #[serde(rename = "attemptId")]
    pub attempt_id: u32,
    pub proposal: String,
    pub result: String,
    // Spelling matches the published response field.
    #[serde(rename = "attemps")]
    pub attempts: u32,
    pub evaluation: f64,
    pub ranking: u32,
    pub win: bool,
}

fn join_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
