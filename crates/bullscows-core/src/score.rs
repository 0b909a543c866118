//! Bulls and cows scoring.

use serde::{Deserialize, Serialize};

/// Matches of one kind between a secret and a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub count: u32,
    pub characters: Vec<char>,
}

/// Digits equal in value and position.
///
/// Compares up to the shorter of the two strings. Every match is recorded in
/// `characters`, repeats included.
pub fn bulls(secret: &str, proposal: &str) -> Score {
    let mut score = Score::default();
    for (s, p) in secret.chars().zip(proposal.chars()) {
        if s == p {
            score.count += 1;
            score.characters.push(s);
        }
    }
    score
}

/// Digits of the secret found at a different position of the proposal.
///
/// Every displaced match counts, so a digit repeated in the proposal is
/// counted once per occurrence. `characters` holds each secret digit once.
pub fn cows(secret: &str, proposal: &str) -> Score {
    let proposal: Vec<char> = proposal.chars().collect();
    let mut score = Score::default();
    for (i, s) in secret.chars().enumerate() {
        for (j, &p) in proposal.iter().enumerate() {
            if i != j && s == p {
                score.count += 1;
                if !score.characters.contains(&s) {
                    score.characters.push(s);
                }
            }
        }
    }
    score
}
