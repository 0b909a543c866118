//! Cross-game ranking.
//!
//! Winners always rank above non-winners. Within each group games are
//! ordered by evaluation (lower is better), ties going to the older game.

use std::cmp::Ordering;

/// The slice of a game record that ranking looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standing {
    pub id: i64,
    pub win: bool,
    pub evaluation: f64,
}

fn by_evaluation(a: &Standing, b: &Standing) -> Ordering {
    a.evaluation
        .total_cmp(&b.evaluation)
        .then_with(|| a.id.cmp(&b.id))
}

/// 1-based rank of `game_id` among `standings`, or 0 if it is not present.
pub fn rank(standings: &[Standing], game_id: i64) -> u32 {
    let (mut winners, mut others): (Vec<&Standing>, Vec<&Standing>) =
        standings.iter().partition(|s| s.win);
    winners.sort_by(|a, b| by_evaluation(a, b));
    others.sort_by(|a, b| by_evaluation(a, b));

    let ordered = winners.iter().chain(others.iter());
    for (position, standing) in (1u32..).zip(ordered) {
        if standing.id == game_id {
            return position;
        }
    }
    0
}
