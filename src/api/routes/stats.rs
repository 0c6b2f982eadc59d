//! Champion stats: per-day winners and multi-day win trends.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::models::{identity_key, Game, GameId, GameScore, ScoringType};
use crate::timewindow;

use super::scores::parse_date;

const DEFAULT_TREND_DAYS: i64 = 7;
const MAX_TREND_DAYS: i64 = 31;
const DEFAULT_TREND_TOP: usize = 5;
const MAX_TREND_TOP: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ChampionsParams {
    /// UTC calendar day, default today.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Champion {
    pub player_name: String,
    pub score: String,
    pub guess_count: Option<u32>,
    pub completion_seconds: Option<f64>,
    pub date_achieved: DateTime<Utc>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GameChampions {
    pub game_id: GameId,
    pub game_name: String,
    pub scoring_type: ScoringType,
    pub champions: Vec<Champion>,
}

#[derive(Debug, Serialize)]
pub struct DailyChampionsResponse {
    pub date: String,
    pub games: Vec<GameChampions>,
}

/// Winners per active game for one UTC calendar day. Champions are every
/// score tied at the day's best value, one entry per player identity.
/// Games with no scores that day are omitted.
pub async fn daily_champions(
    State(state): State<AppState>,
    Query(params): Query<ChampionsParams>,
) -> Result<Json<DailyChampionsResponse>, ApiError> {
    let day: NaiveDate = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    let end = start + chrono::Duration::days(1);

    let mut games = state.store.active_games()?;
    games.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = Vec::new();
    for game in games {
        let scores = state.store.scores_in_range(start, end, Some(game.id))?;
        let winners = calculate::daily_winners(&scores, game.scoring_type);
        if winners.is_empty() {
            continue;
        }

        let champions = winners
            .into_iter()
            .map(|w| Champion {
                player_name: w.player_name.clone(),
                score: game
                    .scoring_type
                    .value_of(w)
                    .map(|v| game.scoring_type.format_value(v))
                    .unwrap_or_default(),
                guess_count: w.guess_count,
                completion_seconds: w.completion_seconds,
                date_achieved: w.date_achieved,
                profile_url: w.profile_url.clone(),
            })
            .collect();

        out.push(GameChampions {
            game_id: game.id,
            game_name: game.name,
            scoring_type: game.scoring_type,
            champions,
        });
    }

    Ok(Json(DailyChampionsResponse {
        date: day.format("%Y-%m-%d").to_string(),
        games: out,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TopWinnersParams {
    pub days: Option<i64>,
    pub top: Option<usize>,
    pub game_id: Option<GameId>,
}

#[derive(Debug, Serialize)]
pub struct TopWinner {
    pub player_name: String,
    pub total_wins: u32,
    /// One count per day label, oldest first.
    pub wins_per_day: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct TopWinnersResponse {
    /// `YYYY-MM-DD` labels, oldest first.
    pub days: Vec<String>,
    pub players: Vec<TopWinner>,
}

/// Win counts per player per reference-timezone day over a trailing
/// window, summed across games (or one game when filtered). Out-of-range
/// `days` and `top` are clamped rather than rejected.
pub async fn top_winners(
    State(state): State<AppState>,
    Query(params): Query<TopWinnersParams>,
) -> Result<Json<TopWinnersResponse>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS).clamp(1, MAX_TREND_DAYS);
    let top = params.top.unwrap_or(DEFAULT_TREND_TOP).clamp(1, MAX_TREND_TOP);

    let mut games = state.store.active_games()?;
    if let Some(game_id) = params.game_id {
        games.retain(|g| g.id == game_id);
        if games.is_empty() {
            return Err(ApiError::NotFound(format!("game {game_id}")));
        }
    }
    games.sort_by(|a, b| a.name.cmp(&b.name));

    let windows = timewindow::recent_windows(state.tz, Utc::now(), days)?;

    // player identity -> (display name, per-day win counts)
    let mut tallies: HashMap<String, (String, Vec<u32>)> = HashMap::new();
    for game in &games {
        let scores =
            state
                .store
                .scores_in_range(windows.utc_start, windows.utc_end, Some(game.id))?;
        tally_game_wins(state.tz, game, &scores, &windows, &mut tallies);
    }

    let mut players: Vec<TopWinner> = tallies
        .into_values()
        .map(|(player_name, wins_per_day)| TopWinner {
            total_wins: wins_per_day.iter().sum(),
            player_name,
            wins_per_day,
        })
        .collect();
    players.sort_by(|a, b| {
        b.total_wins
            .cmp(&a.total_wins)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    players.truncate(top);

    Ok(Json(TopWinnersResponse {
        days: windows
            .days
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        players,
    }))
}

/// Bucket one game's scores by reference-timezone day and credit that
/// day's winners.
fn tally_game_wins(
    tz: chrono_tz::Tz,
    game: &Game,
    scores: &[GameScore],
    windows: &timewindow::RecentWindows,
    tallies: &mut HashMap<String, (String, Vec<u32>)>,
) {
    let mut by_day: HashMap<NaiveDate, Vec<GameScore>> = HashMap::new();
    for score in scores {
        by_day
            .entry(timewindow::local_day(tz, score.date_achieved))
            .or_default()
            .push(score.clone());
    }

    for (day, day_scores) in by_day {
        let Some(&day_index) = windows.index.get(&day) else {
            continue;
        };
        for winner in calculate::daily_winners(&day_scores, game.scoring_type) {
            let entry = tallies
                .entry(identity_key(winner))
                .or_insert_with(|| (winner.player_name.clone(), vec![0; windows.days.len()]));
            entry.1[day_index] += 1;
        }
    }
}
