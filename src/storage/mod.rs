//! Filesystem persistence.
//!
//! JSONL files under the data directory are the source of truth:
//! - `games.jsonl`: one game per line
//! - `scores.jsonl`: one score submission per line
//!
//! Reads happen fresh per request; writes rewrite the affected file
//! under a lock with an optimistic version check per record.

use std::path::PathBuf;
use thiserror::Error;

mod jsonl;
mod store;

pub use jsonl::{EntityType, JsonlReader, JsonlWriter};
pub use store::Store;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} not found")]
    RecordNotFound(String),

    #[error("stale write for {record}: expected version {expected}, found {found}")]
    VersionConflict {
        record: String,
        expected: u32,
        found: u32,
    },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        self.data_dir.join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
