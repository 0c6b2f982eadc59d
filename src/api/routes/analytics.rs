//! Analytics endpoints: derived statistics over historical scores.
//!
//! Each handler fetches the score window for every active game (name
//! ascending, so per-game output order is stable), hands the slices to
//! the calculation engine, and assembles a per-game response.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::calculate::{
    CloseCallExample, ComebackPlayer, ConsistencyPlayer, DistributionBucket, PhotoFinish,
    Temperature, Trend,
};
use crate::models::{name_key, Game, GameId, GameScore, ScoringType};
use crate::timewindow;

use super::scores::parse_date;

const DEFAULT_CLOSE_CALL_DAYS: i64 = 7;
const DEFAULT_COMEBACK_DAYS: i64 = 14;
const DEFAULT_CONSISTENCY_DAYS: i64 = 30;
const DEFAULT_CONSISTENCY_MIN_SCORES: usize = 5;
const DEFAULT_DISTRIBUTION_DAYS: i64 = 30;
const DEFAULT_TEMPERATURE_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct DaysParams {
    pub days: Option<i64>,
}

/// Rolling cutoff for a trailing window: whole 24h periods back from now.
fn window_days(requested: Option<i64>, default: i64) -> Result<i64, ApiError> {
    let days = requested.unwrap_or(default);
    if days < 1 {
        return Err(ApiError::BadRequest(format!(
            "days must be at least 1, got {days}"
        )));
    }
    Ok(days)
}

/// Active games sorted by name, each with its scores since the cutoff.
fn games_with_windows(
    state: &AppState,
    days: i64,
) -> Result<Vec<(Game, Vec<GameScore>)>, ApiError> {
    let now = Utc::now();
    let cutoff = now - Duration::days(days);

    let mut games = state.store.active_games()?;
    games.sort_by(|a, b| a.name.cmp(&b.name));

    games
        .into_iter()
        .map(|game| {
            let scores = state.store.scores_in_range(cutoff, now, Some(game.id))?;
            Ok((game, scores))
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct GameCloseCalls {
    pub game_id: GameId,
    pub game_name: String,
    pub scoring_type: ScoringType,
    pub count: u32,
    pub examples: Vec<CloseCallExample>,
}

pub async fn close_calls(
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> Result<Json<Vec<GameCloseCalls>>, ApiError> {
    let days = window_days(params.days, DEFAULT_CLOSE_CALL_DAYS)?;

    let mut out = Vec::new();
    for (game, scores) in games_with_windows(&state, days)? {
        let result = calculate::close_calls(&scores, game.scoring_type);
        out.push(GameCloseCalls {
            game_id: game.id,
            game_name: game.name,
            scoring_type: game.scoring_type,
            count: result.count,
            examples: result.examples,
        });
    }
    Ok(Json(out))
}

#[derive(Debug, Serialize)]
pub struct GameComebacks {
    pub game_id: GameId,
    pub game_name: String,
    pub scoring_type: ScoringType,
    pub players: Vec<ComebackPlayer>,
}

pub async fn comeback_kings(
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> Result<Json<Vec<GameComebacks>>, ApiError> {
    let days = window_days(params.days, DEFAULT_COMEBACK_DAYS)?;

    let mut out = Vec::new();
    for (game, scores) in games_with_windows(&state, days)? {
        out.push(GameComebacks {
            game_id: game.id,
            game_name: game.name,
            scoring_type: game.scoring_type,
            players: calculate::comeback_rankings(&scores, game.scoring_type),
        });
    }
    Ok(Json(out))
}

#[derive(Debug, Deserialize)]
pub struct ConsistencyParams {
    pub days: Option<i64>,
    pub min_scores: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GameConsistency {
    pub game_id: GameId,
    pub game_name: String,
    pub scoring_type: ScoringType,
    pub min_scores: usize,
    pub players: Vec<ConsistencyPlayer>,
}

pub async fn consistency_champions(
    State(state): State<AppState>,
    Query(params): Query<ConsistencyParams>,
) -> Result<Json<Vec<GameConsistency>>, ApiError> {
    let days = window_days(params.days, DEFAULT_CONSISTENCY_DAYS)?;
    let min_scores = params.min_scores.unwrap_or(DEFAULT_CONSISTENCY_MIN_SCORES).max(1);

    let mut out = Vec::new();
    for (game, scores) in games_with_windows(&state, days)? {
        out.push(GameConsistency {
            game_id: game.id,
            game_name: game.name,
            scoring_type: game.scoring_type,
            min_scores,
            players: calculate::consistency_rankings(&scores, game.scoring_type, min_scores),
        });
    }
    Ok(Json(out))
}

#[derive(Debug, Serialize)]
pub struct GameDistribution {
    pub game_id: GameId,
    pub game_name: String,
    pub buckets: Vec<DistributionBucket>,
}

/// Histogram per game of the requested scoring type.
pub async fn distribution(
    State(state): State<AppState>,
    Path(scoring_type): Path<String>,
    Query(params): Query<DaysParams>,
) -> Result<Json<Vec<GameDistribution>>, ApiError> {
    let scoring: ScoringType = scoring_type.parse().map_err(ApiError::BadRequest)?;
    let days = window_days(params.days, DEFAULT_DISTRIBUTION_DAYS)?;

    let mut out = Vec::new();
    for (game, scores) in games_with_windows(&state, days)? {
        if game.scoring_type != scoring {
            continue;
        }
        out.push(GameDistribution {
            game_id: game.id,
            game_name: game.name,
            buckets: calculate::distribution(&scores, scoring),
        });
    }
    Ok(Json(out))
}

#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GamePhotoFinish {
    pub game_id: GameId,
    pub game_name: String,
    pub scoring_type: ScoringType,
    #[serde(flatten)]
    pub finish: PhotoFinish,
}

#[derive(Debug, Serialize)]
pub struct PhotoFinishResponse {
    pub date: String,
    pub finishes: Vec<GamePhotoFinish>,
}

/// Photo finishes for one reference-timezone day, default today. Games
/// whose top two were not that tight are omitted.
pub async fn photo_finish(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<PhotoFinishResponse>, ApiError> {
    let date = params.date.as_deref().map(parse_date).transpose()?;
    let range = timewindow::day_range(state.tz, Utc::now(), date);

    let mut games = state.store.active_games()?;
    games.sort_by(|a, b| a.name.cmp(&b.name));

    let mut finishes = Vec::new();
    for game in games {
        let scores = state
            .store
            .scores_in_range(range.utc_start, range.utc_end, Some(game.id))?;
        if let Some(finish) = calculate::photo_finish(&scores, game.scoring_type) {
            finishes.push(GamePhotoFinish {
                game_id: game.id,
                game_name: game.name,
                scoring_type: game.scoring_type,
                finish,
            });
        }
    }

    Ok(Json(PhotoFinishResponse {
        date: range.day.format("%Y-%m-%d").to_string(),
        finishes,
    }))
}

#[derive(Debug, Serialize)]
pub struct GameTemperature {
    pub game_id: GameId,
    pub game_name: String,
    pub scoring_type: ScoringType,
    pub temperature: Temperature,
    pub trend: Trend,
    pub score_count: u32,
    pub latest_score: String,
    pub best_score: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerTemperatureResponse {
    pub player_name: String,
    pub overall_temperature: Temperature,
    pub games: Vec<GameTemperature>,
}

/// Temperature and trend for one player across every game they played
/// in the window. Matching is by display name only, so the same person
/// under two spellings of their name reads as one player here even when
/// their profile URLs differ.
pub async fn player_temperature(
    State(state): State<AppState>,
    Path(player_name): Path<String>,
    Query(params): Query<DaysParams>,
) -> Result<Json<PlayerTemperatureResponse>, ApiError> {
    let days = window_days(params.days, DEFAULT_TEMPERATURE_DAYS)?;
    let wanted = name_key(&player_name);

    let mut games_out = Vec::new();
    let mut temps = Vec::new();
    for (game, scores) in games_with_windows(&state, days)? {
        let mut mine: Vec<(&GameScore, f64)> = calculate::qualifying(&scores, game.scoring_type)
            .into_iter()
            .filter(|(s, _)| name_key(&s.player_name) == wanted)
            .collect();
        if mine.is_empty() {
            continue;
        }
        mine.sort_by_key(|(s, _)| s.date_achieved);

        let values: Vec<f64> = mine.iter().map(|(_, v)| *v).collect();
        let temp = calculate::temperature(&values, game.scoring_type);
        let best = values.iter().cloned().fold(f64::MAX, f64::min);
        // Sorted chronologically, so the last value is the latest.
        let latest = values[values.len() - 1];

        temps.push(temp);
        games_out.push(GameTemperature {
            game_id: game.id,
            game_name: game.name,
            scoring_type: game.scoring_type,
            temperature: temp,
            trend: calculate::trend(&values, game.scoring_type),
            score_count: values.len() as u32,
            latest_score: game.scoring_type.format_value(latest),
            best_score: game.scoring_type.format_value(best),
        });
    }

    Ok(Json(PlayerTemperatureResponse {
        player_name,
        overall_temperature: calculate::overall_temperature(&temps),
        games: games_out,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::testkit::*;
    use crate::models::ScoringType;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};

    fn recent(hours_ago: i64) -> chrono::DateTime<Utc> {
        Utc::now() - Duration::hours(hours_ago)
    }

    #[tokio::test]
    async fn test_close_calls_per_game() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;

        // Same instant so the pair cannot straddle a UTC midnight.
        let base = Utc::now() - Duration::days(1);
        seed_score(&state, game.id, "A", None, Some(31.0), base).await;
        seed_score(&state, game.id, "B", None, Some(33.0), base).await;

        let (status, json) =
            get_json(build_router(state), "/api/analytics/close-calls").await;
        assert_eq!(status, StatusCode::OK);
        let games = json.as_array().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["game_name"], "Queens");
        assert_eq!(games[0]["count"], 1);
        assert_eq!(games[0]["examples"][0]["margin"], "2.0s");
    }

    #[tokio::test]
    async fn test_close_calls_rejects_bad_days() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let (status, _) =
            get_json(build_router(state), "/api/analytics/close-calls?days=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_comeback_kings() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;

        for (days_ago, v) in [(4, 40.0), (3, 38.0), (2, 30.0)] {
            seed_score(&state, game.id, "Alice", None, Some(v), recent(days_ago * 24)).await;
        }

        let (status, json) =
            get_json(build_router(state), "/api/analytics/comeback-kings").await;
        assert_eq!(status, StatusCode::OK);
        let players = json[0]["players"].as_array().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0]["player_name"], "Alice");
        assert_eq!(players[0]["total_improvements"], 1);
    }

    #[tokio::test]
    async fn test_consistency_min_scores_param() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Pinpoint", ScoringType::Guesses).await;

        for i in 0..3 {
            seed_score(&state, game.id, "Alice", Some(3), None, recent(i * 24 + 1)).await;
        }

        // Default min of 5 excludes her; an explicit 3 includes her.
        let (_, json) = get_json(
            build_router(state.clone()),
            "/api/analytics/consistency-champions",
        )
        .await;
        assert!(json[0]["players"].as_array().unwrap().is_empty());

        let (_, json) = get_json(
            build_router(state),
            "/api/analytics/consistency-champions?min_scores=3",
        )
        .await;
        let players = json[0]["players"].as_array().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0]["coefficient_of_variation"], 0.0);
    }

    #[tokio::test]
    async fn test_distribution_filters_by_scoring_type() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let timed = seed_game(&state, "Queens", ScoringType::Time).await;
        seed_game(&state, "Pinpoint", ScoringType::Guesses).await;
        seed_score(&state, timed.id, "Alice", None, Some(45.0), recent(2)).await;

        let (status, json) =
            get_json(build_router(state), "/api/analytics/distribution/time").await;
        assert_eq!(status, StatusCode::OK);
        let games = json.as_array().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["game_name"], "Queens");
        assert_eq!(games[0]["buckets"][1]["label"], "31-60s");
        assert_eq!(games[0]["buckets"][1]["count"], 1);
    }

    #[tokio::test]
    async fn test_distribution_unknown_scoring_type() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let (status, _) =
            get_json(build_router(state), "/api/analytics/distribution/points").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_photo_finish_on_explicit_date() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;

        // Mid-day Pacific on 2026-08-10.
        seed_score(&state, game.id, "A", None, Some(31.0), utc("2026-08-10T18:00:00Z")).await;
        seed_score(&state, game.id, "B", None, Some(33.0), utc("2026-08-10T19:00:00Z")).await;

        let (status, json) = get_json(
            build_router(state),
            "/api/analytics/photo-finish?date=2026-08-10",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2026-08-10");
        let finishes = json["finishes"].as_array().unwrap();
        assert_eq!(finishes.len(), 1);
        assert_eq!(finishes[0]["leader"], "A");
        assert_eq!(finishes[0]["margin"], "2.0s");
    }

    #[tokio::test]
    async fn test_photo_finish_bad_date() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let (status, _) = get_json(
            build_router(state),
            "/api/analytics/photo-finish?date=yesterday",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_player_temperature_matches_name_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;

        for (hours_ago, v) in [(40, 50.0), (30, 32.0), (20, 31.0), (10, 30.0)] {
            seed_score(&state, game.id, "Alice", None, Some(v), recent(hours_ago)).await;
        }

        let (status, json) = get_json(
            build_router(state),
            "/api/analytics/player-temperature/ALICE",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["player_name"], "ALICE");
        let games = json["games"].as_array().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["score_count"], 4);
        assert_eq!(games[0]["latest_score"], "30.0s");
        assert_eq!(games[0]["best_score"], "30.0s");
        // The last three average within 5s of the personal best.
        assert_eq!(games[0]["temperature"], "Hot");
        assert_eq!(json["overall_temperature"], "Hot");
    }

    #[tokio::test]
    async fn test_player_temperature_unknown_player_is_cold() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        seed_game(&state, "Queens", ScoringType::Time).await;

        let (status, json) = get_json(
            build_router(state),
            "/api/analytics/player-temperature/Nobody",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["games"].as_array().unwrap().is_empty());
        assert_eq!(json["overall_temperature"], "Cold");
    }
}
