//! Secret number generation.

use rand::RngExt;

/// Number of digits in a secret and in every proposal.
pub const DIGITS: usize = 4;

const LOWEST: u32 = 1000;
const HIGHEST: u32 = 9999;

/// Draw a secret from the thread-local RNG.
pub fn generate() -> String {
    generate_with(&mut rand::rng())
}

/// Draw a 4-digit secret with pairwise distinct digits and no leading zero.
///
/// Candidates are drawn uniformly from `1000..=9999` and redrawn until all
/// four digits differ.
pub fn generate_with<R: RngExt>(rng: &mut R) -> String {
    loop {
        let candidate = rng.random_range(LOWEST..=HIGHEST).to_string();
        if has_distinct_digits(&candidate) {
            return candidate;
        }
    }
}

/// True when no character occurs twice in `value`.
pub fn has_distinct_digits(value: &str) -> bool {
    let mut seen = [false; 256];
    value.bytes().all(|b| !std::mem::replace(&mut seen[usize::from(b)], true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_have_four_distinct_digits() {
        for _ in 0..2000 {
            let secret = generate();
            assert_eq!(secret.len(), DIGITS, "secret {secret}");
            assert!(secret.bytes().all(|b| b.is_ascii_digit()), "secret {secret}");
            assert!(has_distinct_digits(&secret), "secret {secret}");
            assert_ne!(secret.as_bytes()[0], b'0', "secret {secret}");
        }
    }

    #[test]
    fn distinct_digit_check() {
        assert!(has_distinct_digits("1234"));
        assert!(has_distinct_digits("9071"));
        assert!(!has_distinct_digits("1123"));
        assert!(!has_distinct_digits("9899"));
    }
}
