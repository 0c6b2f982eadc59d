//! Score statistics calculation engine.
//!
//! Pure in-memory aggregation over score records fetched for a date
//! window. Computes derived metrics for the analytics endpoints:
//! - Close-call and photo-finish detection
//! - Comeback (improvement streak) ranking
//! - Consistency (variance) ranking and score distribution histograms
//! - Player trend and temperature classification
//! - Tie-aware daily winner selection
//!
//! Nothing here touches storage or the clock; callers supply the score
//! slice and the owning game's scoring type.

use crate::models::{GameScore, ScoringType};

mod consistency;
mod margins;
mod trends;
mod winners;

pub use consistency::*;
pub use margins::*;
pub use trends::*;
pub use winners::*;

/// Scores with a defined value for the scoring type, paired with that
/// value. Records lacking the relevant field are excluded, not zeroed.
pub fn qualifying(scores: &[GameScore], scoring: ScoringType) -> Vec<(&GameScore, f64)> {
    scores
        .iter()
        .filter_map(|s| scoring.value_of(s).map(|v| (s, v)))
        .collect()
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn test_qualifying_excludes_missing_values() {
        let mut scores = vec![
            time_score("Alice", 31.0, "2026-08-10T15:00:00Z"),
            guess_score("Bob", 4, "2026-08-10T15:00:00Z"),
        ];
        scores[1].completion_seconds = None;

        let q = qualifying(&scores, ScoringType::Time);
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, 31.0);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_population_std_dev() {
        // Population stddev of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[5.0]), 0.0);
    }
}
