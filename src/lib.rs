//! Ranked - pairwise profile ranking service
//!
//! Profiles are compared head to head; each vote moves both Elo ratings in
//! one conditional commit, and a deterministic leaderboard ranks the
//! population. The engine itself is pure and store-agnostic.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    build_leaderboard, expected_score, sample_pair, update, VoteCoordinator, VoteError, VoteReceipt,
};
pub use crate::models::{LeaderboardRow, Outcome, Profile, ProfileId, RatingRecord, INITIAL_RATING};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let expected = expected_score(1500, 1500);
        assert!((expected - 0.5).abs() < 1e-12);
        assert_eq!(INITIAL_RATING, 1500);
    }
}
