//! # Puzzle Scoreboard
//!
//! A leaderboard and analytics service for daily puzzle games.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (games, scores, player identity)
//! - **storage**: Filesystem JSONL store with range queries and versioned writes
//! - **timewindow**: Reference-timezone calendar day windows in UTC
//! - **calculate**: Score statistics and derived analytics computation
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;
pub mod timewindow;

pub use models::*;
