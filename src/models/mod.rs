//! Core data models for the scoreboard.

mod game;
mod identity;
mod ids;
mod score;

pub use game::*;
pub use identity::*;
pub use ids::*;
pub use score::*;
