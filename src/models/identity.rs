//! Normalized player identity keys.
//!
//! Display names are free text; two submissions belong to the same
//! competitor when their normalized keys match. The profile URL, when
//! present, is the stronger key.

use super::GameScore;

/// Identity key preferring the profile URL over the display name.
///
/// Used by champion/winner aggregations to deduplicate a player's
/// multiple qualifying scores.
pub fn identity_key(score: &GameScore) -> String {
    match score.profile_url.as_deref() {
        Some(url) if !url.trim().is_empty() => url.trim().to_lowercase(),
        _ => name_key(&score.player_name),
    }
}

/// Name-only identity key: trimmed, lowercased display name.
///
/// Player-temperature lookups match on the name alone, deliberately
/// ignoring the profile URL. The two rules diverge for players who
/// submit under several display names against one profile URL; tests
/// pin both behaviors so the divergence stays visible.
pub fn name_key(player_name: &str) -> String {
    player_name.trim().to_lowercase()
}
