//! Per-player trajectory metrics: comebacks, trend, and temperature.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{identity_key, GameScore, ScoringType};

use super::{mean, qualifying};

const COMEBACK_TOP_N: usize = 5;

/// A player ranked by improvement streaks within a window.
#[derive(Debug, Clone, Serialize)]
pub struct ComebackPlayer {
    pub player_name: String,
    pub total_improvements: u32,
    pub average_improvement: f64,
    pub max_improvement: f64,
    pub score_count: u32,
}

/// Rank players by comeback strength.
///
/// A player needs at least three qualifying scores. Over every
/// chronological window of three, improvement = mean of the first two
/// minus the last; lower is better for both scoring types, so positive
/// means the player beat their own recent form. Players qualify with one
/// or more positive improvements and rank by count, then average.
pub fn comeback_rankings(scores: &[GameScore], scoring: ScoringType) -> Vec<ComebackPlayer> {
    let mut by_player: HashMap<String, Vec<(&GameScore, f64)>> = HashMap::new();
    for (score, value) in qualifying(scores, scoring) {
        by_player
            .entry(identity_key(score))
            .or_default()
            .push((score, value));
    }

    let mut ranked: Vec<ComebackPlayer> = Vec::new();
    for player_scores in by_player.into_values() {
        let mut ordered = player_scores;
        ordered.sort_by_key(|(s, _)| s.date_achieved);
        if ordered.len() < 3 {
            continue;
        }

        let values: Vec<f64> = ordered.iter().map(|(_, v)| *v).collect();
        let improvements: Vec<f64> = values
            .windows(3)
            .map(|w| mean(&w[..2]) - w[2])
            .filter(|imp| *imp > 0.0)
            .collect();
        if improvements.is_empty() {
            continue;
        }

        let max_improvement = improvements.iter().cloned().fold(f64::MIN, f64::max);
        ranked.push(ComebackPlayer {
            player_name: ordered[0].0.player_name.clone(),
            total_improvements: improvements.len() as u32,
            average_improvement: mean(&improvements),
            max_improvement,
            score_count: ordered.len() as u32,
        });
    }

    ranked.sort_by(|a, b| {
        b.total_improvements
            .cmp(&a.total_improvements)
            .then(b.average_improvement.total_cmp(&a.average_improvement))
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    ranked.truncate(COMEBACK_TOP_N);
    ranked
}

/// Direction of a player's scores across a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// How a player's recent scores compare to their own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Temperature {
    Hot,
    Warm,
    Cool,
    Cold,
}

fn trend_threshold(scoring: ScoringType) -> f64 {
    match scoring {
        ScoringType::Time => 5.0,
        ScoringType::Guesses => 0.5,
    }
}

fn avg_threshold(scoring: ScoringType) -> f64 {
    match scoring {
        ScoringType::Time => 10.0,
        ScoringType::Guesses => 1.0,
    }
}

/// Classify a trend by comparing first-half and second-half averages of
/// chronologically ordered values. With an odd count the middle value
/// belongs to the second half. Fewer than three values reads as Stable.
pub fn trend(values: &[f64], scoring: ScoringType) -> Trend {
    if values.len() < 3 {
        return Trend::Stable;
    }
    let half = values.len() / 2;
    let improvement = mean(&values[..half]) - mean(&values[half..]);
    let threshold = trend_threshold(scoring);

    if improvement > threshold {
        Trend::Improving
    } else if improvement < -threshold {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Classify temperature from chronologically ordered values.
///
/// Recent form is the last up-to-three values. Being within the best
/// threshold of the personal best reads Hot; beating the all-time
/// average by more than the average threshold reads Warm; staying
/// within it reads Cool; anything worse reads Cold.
pub fn temperature(values: &[f64], scoring: ScoringType) -> Temperature {
    if values.is_empty() {
        return Temperature::Cold;
    }

    let recent_start = values.len() - values.len().min(3);
    let recent_avg = mean(&values[recent_start..]);
    let all_time_avg = mean(values);
    let best = values.iter().cloned().fold(f64::MAX, f64::min);

    let improvement_from_best = best - recent_avg;
    let improvement_from_avg = all_time_avg - recent_avg;

    if improvement_from_best.abs() <= trend_threshold(scoring) {
        Temperature::Hot
    } else if improvement_from_avg > avg_threshold(scoring) {
        Temperature::Warm
    } else if improvement_from_avg.abs() <= avg_threshold(scoring) {
        Temperature::Cool
    } else {
        Temperature::Cold
    }
}

/// Most frequent per-game temperature; ties go to the label seen first.
/// Callers iterate games in name-ascending order so the tie-break is
/// reproducible. Defaults to Cold with no games.
pub fn overall_temperature(per_game: &[Temperature]) -> Temperature {
    let mut counts: HashMap<Temperature, u32> = HashMap::new();
    for temp in per_game {
        *counts.entry(*temp).or_default() += 1;
    }

    let mut best = Temperature::Cold;
    let mut best_count = 0;
    for temp in per_game {
        let count = counts[temp];
        if count > best_count {
            best = *temp;
            best_count = count;
        }
    }
    best
}
