//! Game CRUD endpoints. Mutations are admin-gated.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::auth::AdminSession;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Game, GameId, ScoringType};

pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<Game>>, ApiError> {
    let mut games = state.store.active_games()?;
    games.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(games))
}

/// Every game including deactivated ones, for the admin panel.
pub async fn list_all_games(
    _session: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<Game>>, ApiError> {
    let mut games = state.store.games()?;
    games.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(games))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> Result<Json<Game>, ApiError> {
    let game = state
        .store
        .game(id)?
        .filter(|g| g.is_active)
        .ok_or_else(|| ApiError::NotFound(format!("game {id}")))?;
    Ok(Json(game))
}

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub scoring_type: ScoringType,
}

pub async fn create_game(
    _session: AdminSession,
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("game name must not be empty".into()));
    }

    let game = Game::new(name.to_string(), req.description, req.scoring_type);
    state.store.insert_game(game.clone()).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGameRequest {
    pub id: GameId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    pub scoring_type: ScoringType,
    pub version: u32,
}

pub async fn update_game(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    Json(req): Json<UpdateGameRequest>,
) -> Result<StatusCode, ApiError> {
    if req.id != id {
        return Err(ApiError::BadRequest(
            "body id does not match path id".into(),
        ));
    }

    let existing = state
        .store
        .game(id)?
        .ok_or_else(|| ApiError::NotFound(format!("game {id}")))?;

    let updated = Game {
        id,
        name: req.name,
        description: req.description,
        created_at: existing.created_at,
        is_active: req.is_active,
        scoring_type: req.scoring_type,
        version: req.version,
    };
    state.store.update_game(updated).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_game(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> Result<StatusCode, ApiError> {
    state.store.deactivate_game(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::testkit::*;
    use crate::models::ScoringType;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_games_only_active_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        seed_game(&state, "Pinpoint", ScoringType::Guesses).await;
        let hidden = seed_game(&state, "Archived", ScoringType::Time).await;
        state.store.deactivate_game(hidden.id).await.unwrap();
        seed_game(&state, "Crossclimb", ScoringType::Time).await;

        let (status, json) = get_json(build_router(state), "/api/games").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Crossclimb", "Pinpoint"]);
    }

    #[tokio::test]
    async fn test_get_game_hides_inactive() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;
        state.store.deactivate_game(game.id).await.unwrap();

        let (status, _) =
            get_json(build_router(state), &format!("/api/games/{}", game.id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_game_requires_admin() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let body = r#"{"name":"Queens","scoring_type":"time"}"#;

        let (status, _) =
            send_json(build_router(state.clone()), "POST", "/api/games", body, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = admin_token(&state).await;
        let (status, json) = send_json(
            build_router(state),
            "POST",
            "/api/games",
            body,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["name"], "Queens");
        assert_eq!(json["scoring_type"], "time");
        assert_eq!(json["is_active"], true);
    }

    #[tokio::test]
    async fn test_create_game_rejects_blank_name() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let token = admin_token(&state).await;
        let (status, _) = send_json(
            build_router(state),
            "POST",
            "/api/games",
            r#"{"name":"  ","scoring_type":"time"}"#,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_game_id_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;
        let other = seed_game(&state, "Pinpoint", ScoringType::Guesses).await;
        let token = admin_token(&state).await;

        let body = format!(
            r#"{{"id":"{}","name":"Queens","is_active":true,"scoring_type":"time","version":0}}"#,
            other.id
        );
        let (status, _) = send_json(
            build_router(state),
            "PUT",
            &format!("/api/games/{}", game.id),
            &body,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_game_stale_version_conflicts() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;
        let token = admin_token(&state).await;

        let body = format!(
            r#"{{"id":"{0}","name":"Queens II","is_active":true,"scoring_type":"time","version":0}}"#,
            game.id
        );
        let uri = format!("/api/games/{}", game.id);

        let (status, _) = send_json(
            build_router(state.clone()),
            "PUT",
            &uri,
            &body,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Same version again: the first update already bumped it.
        let (status, _) =
            send_json(build_router(state), "PUT", &uri, &body, Some(&token)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_missing_game_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let token = admin_token(&state).await;
        let id = crate::models::GameId::generate();

        let body = format!(
            r#"{{"id":"{id}","name":"Ghost","is_active":true,"scoring_type":"time","version":0}}"#
        );
        let (status, _) = send_json(
            build_router(state),
            "PUT",
            &format!("/api/games/{id}"),
            &body,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_game_soft_deletes() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path());
        let game = seed_game(&state, "Queens", ScoringType::Time).await;
        let token = admin_token(&state).await;

        let (status, _) = send_json(
            build_router(state.clone()),
            "DELETE",
            &format!("/api/games/{}", game.id),
            "",
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!state.store.game(game.id).unwrap().unwrap().is_active);
    }
}
