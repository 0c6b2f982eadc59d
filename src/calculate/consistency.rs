//! Consistency ranking and score distribution histograms.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{identity_key, GameScore, ScoringType};

use super::{mean, population_std_dev, qualifying};

const CONSISTENCY_TOP_N: usize = 10;

/// A player ranked by how little their scores vary.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyPlayer {
    pub player_name: String,
    pub score_count: u32,
    pub mean: f64,
    pub std_dev: f64,
    /// stddev / mean x 100; 0 when the mean is 0.
    pub coefficient_of_variation: f64,
    pub best_score: f64,
    pub worst_score: f64,
}

/// Rank players by coefficient of variation, most consistent first.
/// Players with fewer than `min_scores` qualifying scores are excluded
/// even when they have other records in range.
pub fn consistency_rankings(
    scores: &[GameScore],
    scoring: ScoringType,
    min_scores: usize,
) -> Vec<ConsistencyPlayer> {
    let mut by_player: HashMap<String, (String, Vec<f64>)> = HashMap::new();
    for (score, value) in qualifying(scores, scoring) {
        by_player
            .entry(identity_key(score))
            .or_insert_with(|| (score.player_name.clone(), Vec::new()))
            .1
            .push(value);
    }

    let mut ranked: Vec<ConsistencyPlayer> = by_player
        .into_values()
        .filter(|(_, values)| values.len() >= min_scores)
        .map(|(player_name, values)| {
            let m = mean(&values);
            let std_dev = population_std_dev(&values);
            let cv = if m > 0.0 { std_dev / m * 100.0 } else { 0.0 };
            ConsistencyPlayer {
                player_name,
                score_count: values.len() as u32,
                mean: m,
                std_dev,
                coefficient_of_variation: cv,
                best_score: values.iter().cloned().fold(f64::MAX, f64::min),
                worst_score: values.iter().cloned().fold(f64::MIN, f64::max),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.coefficient_of_variation
            .total_cmp(&b.coefficient_of_variation)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    ranked.truncate(CONSISTENCY_TOP_N);
    ranked
}

/// One histogram bucket.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DistributionBucket {
    pub label: &'static str,
    pub count: u32,
}

const TIME_BUCKETS: [&str; 5] = ["0-30s", "31-60s", "61-120s", "121-300s", "300s+"];
const GUESS_BUCKETS: [&str; 6] = ["1", "2", "3", "4", "5", "6+"];

/// Bucket qualifying scores into the fixed histogram for the scoring
/// type. Time boundaries are inclusive on the upper end; guesses match
/// 1 through 5 exactly with everything else in the overflow bucket.
pub fn distribution(scores: &[GameScore], scoring: ScoringType) -> Vec<DistributionBucket> {
    let labels: &[&'static str] = match scoring {
        ScoringType::Time => &TIME_BUCKETS,
        ScoringType::Guesses => &GUESS_BUCKETS,
    };
    let mut counts = vec![0u32; labels.len()];

    for (_, value) in qualifying(scores, scoring) {
        let idx = match scoring {
            ScoringType::Time => {
                if value <= 30.0 {
                    0
                } else if value <= 60.0 {
                    1
                } else if value <= 120.0 {
                    2
                } else if value <= 300.0 {
                    3
                } else {
                    4
                }
            }
            ScoringType::Guesses => match value.round() as u32 {
                n @ 1..=5 => (n - 1) as usize,
                _ => 5,
            },
        };
        counts[idx] += 1;
    }

    labels
        .iter()
        .zip(counts)
        .map(|(label, count)| DistributionBucket { label, count })
        .collect()
}
