//! Leaderboard - ranked records of finished shifts

pub mod entry;
pub mod store;

pub use entry::{Leaderboard, LeaderboardEntry};
pub use store::{today, LeaderboardFilter, LeaderboardStore};
