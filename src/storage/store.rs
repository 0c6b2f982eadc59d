//! Record store over the JSONL files.
//!
//! Reads go straight to disk so every request sees the latest data.
//! Mutations serialize through a single async lock and rewrite the
//! affected file; updates carry an optimistic version check so a stale
//! write fails as a conflict, distinct from not-found.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::{Game, GameId, GameScore, ScoreId};

use super::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};

/// Facade over the games and scores files.
pub struct Store {
    config: StorageConfig,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    fn game_reader(&self) -> JsonlReader<Game> {
        JsonlReader::for_entity(&self.config, EntityType::Game)
    }

    fn score_reader(&self) -> JsonlReader<GameScore> {
        JsonlReader::for_entity(&self.config, EntityType::Score)
    }

    // ── Games ───────────────────────────────────────────────────

    /// All games, active or not.
    pub fn games(&self) -> Result<Vec<Game>, StorageError> {
        self.game_reader().read_all()
    }

    /// Active games only.
    pub fn active_games(&self) -> Result<Vec<Game>, StorageError> {
        self.game_reader().read_where(|g| g.is_active)
    }

    pub fn game(&self, id: GameId) -> Result<Option<Game>, StorageError> {
        Ok(self.games()?.into_iter().find(|g| g.id == id))
    }

    pub async fn insert_game(&self, game: Game) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        JsonlWriter::for_entity(&self.config, EntityType::Game).append(&game)
    }

    /// Replace a game record, enforcing the version check.
    /// The stored record's version must equal the caller's; the saved
    /// copy gets version + 1.
    pub async fn update_game(&self, game: Game) -> Result<Game, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut games = self.games()?;
        let slot = games
            .iter_mut()
            .find(|g| g.id == game.id)
            .ok_or_else(|| StorageError::RecordNotFound(format!("game {}", game.id)))?;
        if slot.version != game.version {
            return Err(StorageError::VersionConflict {
                record: format!("game {}", game.id),
                expected: game.version,
                found: slot.version,
            });
        }
        let mut updated = game;
        updated.version += 1;
        *slot = updated.clone();
        JsonlWriter::for_entity(&self.config, EntityType::Game).write_all(&games)?;
        Ok(updated)
    }

    /// Soft-delete: clear the active flag, never drop the record.
    pub async fn deactivate_game(&self, id: GameId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut games = self.games()?;
        let slot = games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StorageError::RecordNotFound(format!("game {id}")))?;
        slot.is_active = false;
        slot.version += 1;
        JsonlWriter::for_entity(&self.config, EntityType::Game).write_all(&games)?;
        Ok(())
    }

    // ── Scores ──────────────────────────────────────────────────

    pub fn scores(&self) -> Result<Vec<GameScore>, StorageError> {
        self.score_reader().read_all()
    }

    pub fn score(&self, id: ScoreId) -> Result<Option<GameScore>, StorageError> {
        Ok(self.scores()?.into_iter().find(|s| s.id == id))
    }

    pub fn scores_for_game(&self, game_id: GameId) -> Result<Vec<GameScore>, StorageError> {
        self.score_reader().read_where(|s| s.game_id == game_id)
    }

    /// Scores achieved in `[start, end)`, optionally narrowed to one game.
    pub fn scores_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        game_id: Option<GameId>,
    ) -> Result<Vec<GameScore>, StorageError> {
        self.score_reader().read_where(|s| {
            s.date_achieved >= start
                && s.date_achieved < end
                && game_id.map_or(true, |id| s.game_id == id)
        })
    }

    pub async fn insert_score(&self, score: GameScore) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        JsonlWriter::for_entity(&self.config, EntityType::Score).append(&score)
    }

    pub async fn update_score(&self, score: GameScore) -> Result<GameScore, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut scores = self.scores()?;
        let slot = scores
            .iter_mut()
            .find(|s| s.id == score.id)
            .ok_or_else(|| StorageError::RecordNotFound(format!("score {}", score.id)))?;
        if slot.version != score.version {
            return Err(StorageError::VersionConflict {
                record: format!("score {}", score.id),
                expected: score.version,
                found: slot.version,
            });
        }
        let mut updated = score;
        updated.version += 1;
        *slot = updated.clone();
        JsonlWriter::for_entity(&self.config, EntityType::Score).write_all(&scores)?;
        Ok(updated)
    }

    pub async fn delete_score(&self, id: ScoreId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut scores = self.scores()?;
        let before = scores.len();
        scores.retain(|s| s.id != id);
        if scores.len() == before {
            return Err(StorageError::RecordNotFound(format!("score {id}")));
        }
        JsonlWriter::for_entity(&self.config, EntityType::Score).write_all(&scores)?;
        Ok(())
    }
}
