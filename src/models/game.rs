//! Game model and scoring semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{GameId, GameScore};

/// How a game is scored. Lower derived values are better for both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoringType {
    /// Number of guesses taken; whole numbers, fewer is better.
    #[default]
    Guesses,
    /// Completion time in seconds; fewer is better.
    Time,
}

impl ScoringType {
    /// Derived numeric value of a score under this scoring type.
    ///
    /// Returns `None` when the record lacks the relevant field, in which
    /// case the record does not qualify for aggregation.
    pub fn value_of(&self, score: &GameScore) -> Option<f64> {
        match self {
            ScoringType::Time => score.completion_seconds,
            ScoringType::Guesses => score.guess_count.map(f64::from),
        }
    }

    /// Format a derived value for display: "42.0s" or "3 guesses".
    pub fn format_value(&self, value: f64) -> String {
        match self {
            ScoringType::Time => format!("{value:.1}s"),
            ScoringType::Guesses => format_guesses(value.round() as i64),
        }
    }

    /// Format a margin between two adjacent scores.
    pub fn format_margin(&self, margin: f64) -> String {
        match self {
            ScoringType::Time => format!("{margin:.1}s"),
            ScoringType::Guesses => format_guesses(margin.round() as i64),
        }
    }

    /// Adjacent-pair margin at or under which a finish counts as a close call.
    pub fn close_call_margin(&self) -> f64 {
        match self {
            ScoringType::Time => 5.0,
            ScoringType::Guesses => 1.0,
        }
    }

    /// Whether the gap between the day's top two is a photo finish.
    /// Guesses require an exact tie; times allow a small gap.
    pub fn is_photo_finish(&self, margin: f64) -> bool {
        match self {
            ScoringType::Time => margin <= 3.0,
            ScoringType::Guesses => margin == 0.0,
        }
    }
}

fn format_guesses(n: i64) -> String {
    if n == 1 {
        format!("{n} guess")
    } else {
        format!("{n} guesses")
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringType::Guesses => write!(f, "guesses"),
            ScoringType::Time => write!(f, "time"),
        }
    }
}

impl FromStr for ScoringType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guesses" => Ok(ScoringType::Guesses),
            "time" => Ok(ScoringType::Time),
            other => Err(format!("unknown scoring type: {other}")),
        }
    }
}

/// A puzzle game that players submit scores against.
///
/// Games are soft-deleted by clearing `is_active`; the scoring type is
/// assumed immutable once scores exist against the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub scoring_type: ScoringType,
    /// Optimistic concurrency counter, bumped on every update.
    #[serde(default)]
    pub version: u32,
}

impl Game {
    /// Create a new active game timestamped now.
    pub fn new(name: String, description: String, scoring_type: ScoringType) -> Self {
        Self {
            id: GameId::generate(),
            name,
            description,
            created_at: Utc::now(),
            is_active: true,
            scoring_type,
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreId;

    fn score_with(guesses: Option<u32>, seconds: Option<f64>) -> GameScore {
        GameScore {
            id: ScoreId::generate(),
            game_id: GameId::generate(),
            player_name: "Alice".to_string(),
            guess_count: guesses,
            completion_seconds: seconds,
            date_achieved: Utc::now(),
            profile_url: None,
            image: None,
            version: 0,
        }
    }

    #[test]
    fn test_value_of_time() {
        let s = score_with(Some(4), Some(31.5));
        assert_eq!(ScoringType::Time.value_of(&s), Some(31.5));
    }

    #[test]
    fn test_value_of_guesses() {
        let s = score_with(Some(4), None);
        assert_eq!(ScoringType::Guesses.value_of(&s), Some(4.0));
    }

    #[test]
    fn test_value_of_missing_field_disqualifies() {
        let s = score_with(None, Some(20.0));
        assert_eq!(ScoringType::Guesses.value_of(&s), None);
        let s = score_with(Some(3), None);
        assert_eq!(ScoringType::Time.value_of(&s), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(ScoringType::Time.format_value(31.0), "31.0s");
        assert_eq!(ScoringType::Time.format_value(2.25), "2.2s");
        assert_eq!(ScoringType::Guesses.format_value(1.0), "1 guess");
        assert_eq!(ScoringType::Guesses.format_value(6.0), "6 guesses");
    }

    #[test]
    fn test_format_margin_singular_plural() {
        assert_eq!(ScoringType::Guesses.format_margin(1.0), "1 guess");
        assert_eq!(ScoringType::Guesses.format_margin(2.0), "2 guesses");
        assert_eq!(ScoringType::Time.format_margin(0.35), "0.3s");
    }

    #[test]
    fn test_photo_finish_rules() {
        assert!(ScoringType::Time.is_photo_finish(3.0));
        assert!(!ScoringType::Time.is_photo_finish(3.1));
        assert!(ScoringType::Guesses.is_photo_finish(0.0));
        // One guess apart is close, but not a photo finish.
        assert!(!ScoringType::Guesses.is_photo_finish(1.0));
    }

    #[test]
    fn test_scoring_type_parse() {
        assert_eq!("time".parse::<ScoringType>().unwrap(), ScoringType::Time);
        assert_eq!(
            " Guesses ".parse::<ScoringType>().unwrap(),
            ScoringType::Guesses
        );
        assert!("points".parse::<ScoringType>().is_err());
    }

    #[test]
    fn test_scoring_type_serde() {
        assert_eq!(
            serde_json::to_string(&ScoringType::Time).unwrap(),
            "\"time\""
        );
        let parsed: ScoringType = serde_json::from_str("\"guesses\"").unwrap();
        assert_eq!(parsed, ScoringType::Guesses);
    }

    #[test]
    fn test_new_game_is_active() {
        let g = Game::new("Queens".into(), "Daily puzzle".into(), ScoringType::Time);
        assert!(g.is_active);
        assert_eq!(g.version, 0);
    }
}
