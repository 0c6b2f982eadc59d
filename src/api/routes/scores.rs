//! Score submission, listing, leaderboards, and image retrieval.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::AdminSession;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Game, GameId, GameScore, ScoreId, ScoreImage, ScoringType};
use crate::timewindow;

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// A score as returned by the API: raw fields plus the derived display
/// value and owning-game context. Image bytes stay behind their own
/// endpoint; only a presence flag is carried here.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub id: ScoreId,
    pub game_id: GameId,
    pub player_name: String,
    pub guess_count: Option<u32>,
    pub completion_seconds: Option<f64>,
    /// Derived value truncated for display; absent when the record
    /// lacks the field the game scores by.
    pub score: Option<i64>,
    pub date_achieved: DateTime<Utc>,
    pub profile_url: Option<String>,
    pub game_name: Option<String>,
    pub scoring_type: Option<ScoringType>,
    pub has_image: bool,
    pub version: u32,
}

impl ScoreResponse {
    pub fn build(score: &GameScore, game: Option<&Game>) -> Self {
        Self {
            id: score.id,
            game_id: score.game_id,
            player_name: score.player_name.clone(),
            guess_count: score.guess_count,
            completion_seconds: score.completion_seconds,
            score: game.and_then(|g| g.scoring_type.value_of(score)).map(|v| v as i64),
            date_achieved: score.date_achieved,
            profile_url: score.profile_url.clone(),
            game_name: game.map(|g| g.name.clone()),
            scoring_type: game.map(|g| g.scoring_type),
            has_image: score.image.is_some(),
            version: score.version,
        }
    }
}

fn with_game_context(
    state: &AppState,
    mut scores: Vec<GameScore>,
) -> Result<Vec<ScoreResponse>, ApiError> {
    let games = state.store.games()?;
    scores.sort_by(|a, b| b.date_achieved.cmp(&a.date_achieved));
    Ok(scores
        .iter()
        .map(|s| ScoreResponse::build(s, games.iter().find(|g| g.id == s.game_id)))
        .collect())
}

pub async fn list_scores(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoreResponse>>, ApiError> {
    let scores = state.store.scores()?;
    Ok(Json(with_game_context(&state, scores)?))
}

pub async fn get_score(
    State(state): State<AppState>,
    Path(id): Path<ScoreId>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let score = state
        .store
        .score(id)?
        .ok_or_else(|| ApiError::NotFound(format!("score {id}")))?;
    let game = state.store.game(score.game_id)?;
    Ok(Json(ScoreResponse::build(&score, game.as_ref())))
}

pub async fn scores_for_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<Vec<ScoreResponse>>, ApiError> {
    let scores = state.store.scores_for_game(game_id)?;
    Ok(Json(with_game_context(&state, scores)?))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub top: Option<usize>,
    /// Reference-timezone calendar day to filter to.
    pub date: Option<String>,
}

/// Top scores for a game, best first. Lower derived values rank higher
/// for both scoring types; ties keep insertion order.
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<ScoreResponse>>, ApiError> {
    let game = state
        .store
        .game(game_id)?
        .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;
    let top = params.top.unwrap_or(10).max(1);

    let scores = match params.date.as_deref() {
        Some(raw) => {
            let day = parse_date(raw)?;
            let range = timewindow::day_range(state.tz, Utc::now(), Some(day));
            state
                .store
                .scores_in_range(range.utc_start, range.utc_end, Some(game_id))?
        }
        None => state.store.scores_for_game(game_id)?,
    };

    let mut ranked: Vec<(GameScore, f64)> = scores
        .into_iter()
        .filter_map(|s| game.scoring_type.value_of(&s).map(|v| (s, v)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(top);

    Ok(Json(
        ranked
            .iter()
            .map(|(s, _)| ScoreResponse::build(s, Some(&game)))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub game_id: GameId,
    pub player_name: String,
    pub guess_count: Option<u32>,
    pub completion_seconds: Option<f64>,
    pub profile_url: Option<String>,
    pub image_base64: Option<String>,
    pub image_content_type: Option<String>,
}

pub async fn submit_score(
    State(state): State<AppState>,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<(StatusCode, Json<ScoreResponse>), ApiError> {
    let game = state
        .store
        .game(req.game_id)?
        .ok_or_else(|| ApiError::NotFound(format!("game {}", req.game_id)))?;

    let player_name = req.player_name.trim().to_string();
    if player_name.is_empty() {
        return Err(ApiError::BadRequest("player name must not be empty".into()));
    }

    validate_value(game.scoring_type, req.guess_count, req.completion_seconds)?;

    let profile_url = match req.profile_url.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => {
            url::Url::parse(raw)
                .map_err(|e| ApiError::BadRequest(format!("invalid profile url: {e}")))?;
            Some(raw.to_string())
        }
    };

    let image = decode_image(req.image_base64, req.image_content_type)?;

    let score = GameScore::new(
        req.game_id,
        player_name,
        req.guess_count,
        req.completion_seconds,
        profile_url,
        image,
    );
    state.store.insert_score(score.clone()).await?;
    info!("Recorded score for game {}", game.name);

    Ok((
        StatusCode::CREATED,
        Json(ScoreResponse::build(&score, Some(&game))),
    ))
}

/// The submitted value must match how the game is scored.
fn validate_value(
    scoring: ScoringType,
    guess_count: Option<u32>,
    completion_seconds: Option<f64>,
) -> Result<(), ApiError> {
    match scoring {
        ScoringType::Time => match completion_seconds {
            Some(s) if s.is_finite() && s > 0.0 => Ok(()),
            _ => Err(ApiError::BadRequest(
                "a positive completion_seconds is required for a time-scored game".into(),
            )),
        },
        ScoringType::Guesses => match guess_count {
            Some(g) if g >= 1 => Ok(()),
            _ => Err(ApiError::BadRequest(
                "a guess_count of at least 1 is required for a guess-scored game".into(),
            )),
        },
    }
}

fn decode_image(
    data: Option<String>,
    content_type: Option<String>,
) -> Result<Option<ScoreImage>, ApiError> {
    match (data, content_type) {
        (None, None) => Ok(None),
        (Some(encoded), Some(content_type)) => {
            if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
                return Err(ApiError::BadRequest(format!(
                    "unsupported image type: {content_type}"
                )));
            }
            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| ApiError::BadRequest(format!("invalid image encoding: {e}")))?;
            if bytes.len() > MAX_IMAGE_BYTES {
                return Err(ApiError::BadRequest(format!(
                    "image exceeds the {} byte limit",
                    MAX_IMAGE_BYTES
                )));
            }
            Ok(Some(ScoreImage {
                content_type,
                data: bytes,
            }))
        }
        _ => Err(ApiError::BadRequest(
            "image_base64 and image_content_type must be supplied together".into(),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateScoreRequest {
    pub id: ScoreId,
    pub game_id: GameId,
    pub player_name: String,
    pub guess_count: Option<u32>,
    pub completion_seconds: Option<f64>,
    pub profile_url: Option<String>,
    pub version: u32,
}

pub async fn update_score(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ScoreId>,
    Json(req): Json<UpdateScoreRequest>,
) -> Result<StatusCode, ApiError> {
    if req.id != id {
        return Err(ApiError::BadRequest(
            "body id does not match path id".into(),
        ));
    }

    let game = state
        .store
        .game(req.game_id)?
        .ok_or_else(|| ApiError::NotFound(format!("game {}", req.game_id)))?;
    validate_value(game.scoring_type, req.guess_count, req.completion_seconds)?;

    let existing = state
        .store
        .score(id)?
        .ok_or_else(|| ApiError::NotFound(format!("score {id}")))?;

    // The achievement timestamp and attached image are immutable here.
    let updated = GameScore {
        id,
        game_id: req.game_id,
        player_name: req.player_name,
        guess_count: req.guess_count,
        completion_seconds: req.completion_seconds,
        date_achieved: existing.date_achieved,
        profile_url: req.profile_url,
        image: existing.image,
        version: req.version,
    };
    state.store.update_score(updated).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_score(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<ScoreId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_score(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_score_image(
    State(state): State<AppState>,
    Path(id): Path<ScoreId>,
) -> Result<Response, ApiError> {
    let score = state
        .store
        .score(id)?
        .ok_or_else(|| ApiError::NotFound(format!("score {id}")))?;
    let image = score
        .image
        .ok_or_else(|| ApiError::NotFound(format!("score {id} has no image")))?;

    Ok((
        [(header::CONTENT_TYPE, image.content_type)],
        image.data,
    )
        .into_response())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date (expected YYYY-MM-DD): {raw}")))
}
