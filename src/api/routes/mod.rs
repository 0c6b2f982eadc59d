//! Route handlers grouped by resource.

pub mod admin;
pub mod analytics;
pub mod games;
pub mod scores;
pub mod stats;
