//! Submitted score model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GameId, ScoreId};

/// Image proof attached to a score (a screenshot of the puzzle result).
///
/// Bytes are carried as base64 in the JSONL store and over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreImage {
    /// MIME type, one of image/jpeg, image/png, image/gif.
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// A single score submission for a game.
///
/// Exactly one of `guess_count` / `completion_seconds` is meaningful,
/// chosen by the owning game's scoring type. A record lacking the relevant
/// field is excluded from aggregation rather than treated as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameScore {
    pub id: ScoreId,
    pub game_id: GameId,
    /// Display name as submitted; identity matching normalizes it.
    pub player_name: String,
    pub guess_count: Option<u32>,
    pub completion_seconds: Option<f64>,
    /// UTC instant the score was recorded (server-side, not client-supplied).
    pub date_achieved: DateTime<Utc>,
    /// Optional external profile URL, preferred over the name as identity.
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ScoreImage>,
    /// Optimistic concurrency counter, bumped on every update.
    #[serde(default)]
    pub version: u32,
}

impl GameScore {
    /// Create a new score timestamped now.
    pub fn new(
        game_id: GameId,
        player_name: String,
        guess_count: Option<u32>,
        completion_seconds: Option<f64>,
        profile_url: Option<String>,
        image: Option<ScoreImage>,
    ) -> Self {
        Self {
            id: ScoreId::generate(),
            game_id,
            player_name,
            guess_count,
            completion_seconds,
            date_achieved: Utc::now(),
            profile_url,
            image,
            version: 0,
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
