//! Tie-aware winner selection for a single game and day.

use std::collections::HashSet;

use crate::models::{identity_key, GameScore, ScoringType};

use super::qualifying;

/// All scores tied for the best derived value, deduplicated by
/// normalized player identity (profile URL preferred over name).
///
/// Equality is exact on the raw value, not a rounded display value.
/// A player submitting the winning value twice appears once; which
/// record survives is the earliest in input order.
pub fn daily_winners<'a>(scores: &'a [GameScore], scoring: ScoringType) -> Vec<&'a GameScore> {
    let ranked = qualifying(scores, scoring);
    let best = match ranked
        .iter()
        .map(|(_, v)| *v)
        .min_by(|a, b| a.total_cmp(b))
    {
        Some(best) => best,
        None => return Vec::new(),
    };

    let mut seen: HashSet<String> = HashSet::new();
    ranked
        .into_iter()
        .filter(|(_, v)| *v == best)
        .filter(|(s, _)| seen.insert(identity_key(s)))
        .map(|(s, _)| s)
        .collect()
}
