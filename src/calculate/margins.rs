//! Margin-based detections: close calls and photo finishes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{GameScore, ScoringType};

use super::qualifying;

/// How many example pairs a close-call summary carries.
const MAX_CLOSE_CALL_EXAMPLES: usize = 3;

/// One adjacent pair that finished within the close-call margin.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CloseCallExample {
    pub date: NaiveDate,
    pub winner: String,
    pub runner_up: String,
    pub margin: String,
    pub winner_score: String,
    pub runner_up_score: String,
}

/// Close calls for one game over a window.
#[derive(Debug, Clone, Serialize)]
pub struct CloseCalls {
    pub count: u32,
    pub examples: Vec<CloseCallExample>,
}

/// Detect close calls: within each UTC calendar day holding at least two
/// qualifying scores, every adjacent pair in ascending value order whose
/// margin is at or under the scoring type's threshold (inclusive).
pub fn close_calls(scores: &[GameScore], scoring: ScoringType) -> CloseCalls {
    let threshold = scoring.close_call_margin();

    // BTreeMap keeps day iteration chronological and deterministic.
    let mut by_day: BTreeMap<NaiveDate, Vec<(&GameScore, f64)>> = BTreeMap::new();
    for (score, value) in qualifying(scores, scoring) {
        by_day
            .entry(score.date_achieved.date_naive())
            .or_default()
            .push((score, value));
    }

    let mut count = 0;
    let mut examples = Vec::new();

    for (day, mut day_scores) in by_day {
        if day_scores.len() < 2 {
            continue;
        }
        day_scores.sort_by(|a, b| a.1.total_cmp(&b.1));

        for pair in day_scores.windows(2) {
            let (current, current_value) = pair[0];
            let (next, next_value) = pair[1];
            let margin = next_value - current_value;
            if margin > threshold {
                continue;
            }
            count += 1;
            if examples.len() < MAX_CLOSE_CALL_EXAMPLES {
                examples.push(CloseCallExample {
                    date: day,
                    winner: current.player_name.clone(),
                    runner_up: next.player_name.clone(),
                    margin: scoring.format_margin(margin),
                    winner_score: scoring.format_value(current_value),
                    runner_up_score: scoring.format_value(next_value),
                });
            }
        }
    }

    CloseCalls { count, examples }
}

/// A day's top-two finish within the photo-finish margin.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoFinish {
    pub leader: String,
    pub runner_up: String,
    /// Formatted margin; literal "TIE" for a zero-margin guess tie.
    pub margin: String,
    pub leader_score: String,
    pub runner_up_score: String,
    pub participants: u32,
}

/// Compare the top two qualifying scores of a single day. Times trigger
/// at a margin of 3 seconds or less; guesses only on an exact tie.
pub fn photo_finish(day_scores: &[GameScore], scoring: ScoringType) -> Option<PhotoFinish> {
    let mut ranked = qualifying(day_scores, scoring);
    if ranked.len() < 2 {
        return None;
    }
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (leader, leader_value) = ranked[0];
    let (runner_up, runner_up_value) = ranked[1];
    let margin = runner_up_value - leader_value;

    if !scoring.is_photo_finish(margin) {
        return None;
    }

    let margin_label = if scoring == ScoringType::Guesses && margin == 0.0 {
        "TIE".to_string()
    } else {
        scoring.format_margin(margin)
    };

    Some(PhotoFinish {
        leader: leader.player_name.clone(),
        runner_up: runner_up.player_name.clone(),
        margin: margin_label,
        leader_score: scoring.format_value(leader_value),
        runner_up_score: scoring.format_value(runner_up_value),
        participants: ranked.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_close_calls_example_scenario() {
        // A=31.0s, B=33.0s, C=40.0s on one day: exactly one close call.
        let scores = vec![
            time_score("A", 31.0, "2026-08-10T15:00:00Z"),
            time_score("B", 33.0, "2026-08-10T16:00:00Z"),
            time_score("C", 40.0, "2026-08-10T17:00:00Z"),
        ];
        let result = close_calls(&scores, ScoringType::Time);
        assert_eq!(result.count, 1);
        assert_eq!(result.examples.len(), 1);
        let ex = &result.examples[0];
        assert_eq!(ex.winner, "A");
        assert_eq!(ex.runner_up, "B");
        assert_eq!(ex.margin, "2.0s");
        assert_eq!(ex.winner_score, "31.0s");
        assert_eq!(ex.runner_up_score, "33.0s");
    }

    #[test]
    fn test_close_call_threshold_is_inclusive() {
        let scores = vec![
            time_score("A", 30.0, "2026-08-10T15:00:00Z"),
            time_score("B", 35.0, "2026-08-10T16:00:00Z"),
        ];
        assert_eq!(close_calls(&scores, ScoringType::Time).count, 1);

        let scores = vec![
            guess_score("A", 3, "2026-08-10T15:00:00Z"),
            guess_score("B", 4, "2026-08-10T16:00:00Z"),
        ];
        assert_eq!(close_calls(&scores, ScoringType::Guesses).count, 1);
    }

    #[test]
    fn test_close_calls_do_not_cross_days() {
        let scores = vec![
            time_score("A", 30.0, "2026-08-10T15:00:00Z"),
            time_score("B", 31.0, "2026-08-11T15:00:00Z"),
        ];
        assert_eq!(close_calls(&scores, ScoringType::Time).count, 0);
    }

    #[test]
    fn test_close_calls_caps_examples_at_three() {
        let scores: Vec<_> = (0..6)
            .map(|i| time_score(&format!("P{i}"), 30.0 + i as f64, "2026-08-10T15:00:00Z"))
            .collect();
        let result = close_calls(&scores, ScoringType::Time);
        assert_eq!(result.count, 5);
        assert_eq!(result.examples.len(), 3);
    }

    #[test]
    fn test_photo_finish_time_margin() {
        let scores = vec![
            time_score("A", 31.0, "2026-08-10T15:00:00Z"),
            time_score("B", 33.0, "2026-08-10T16:00:00Z"),
            time_score("C", 40.0, "2026-08-10T17:00:00Z"),
        ];
        let finish = photo_finish(&scores, ScoringType::Time).unwrap();
        assert_eq!(finish.leader, "A");
        assert_eq!(finish.runner_up, "B");
        assert_eq!(finish.margin, "2.0s");
        assert_eq!(finish.participants, 3);
    }

    #[test]
    fn test_photo_finish_time_just_over_margin() {
        let scores = vec![
            time_score("A", 31.0, "2026-08-10T15:00:00Z"),
            time_score("B", 34.5, "2026-08-10T16:00:00Z"),
        ];
        assert!(photo_finish(&scores, ScoringType::Time).is_none());
    }

    #[test]
    fn test_photo_finish_guesses_requires_exact_tie() {
        let tied = vec![
            guess_score("A", 3, "2026-08-10T15:00:00Z"),
            guess_score("B", 3, "2026-08-10T16:00:00Z"),
        ];
        let finish = photo_finish(&tied, ScoringType::Guesses).unwrap();
        assert_eq!(finish.margin, "TIE");

        let near = vec![
            guess_score("A", 3, "2026-08-10T15:00:00Z"),
            guess_score("B", 4, "2026-08-10T16:00:00Z"),
        ];
        assert!(photo_finish(&near, ScoringType::Guesses).is_none());
    }

    #[test]
    fn test_photo_finish_needs_two_qualifying_scores() {
        let scores = vec![time_score("A", 31.0, "2026-08-10T15:00:00Z")];
        assert!(photo_finish(&scores, ScoringType::Time).is_none());
        assert!(photo_finish(&[], ScoringType::Time).is_none());
    }
}
