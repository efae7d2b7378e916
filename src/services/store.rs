use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    LeaderboardRow, NewProfile, Profile, ProfileId, RatingCommit, VersionedRating,
};

/// Errors that can occur when interacting with the rating store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile not found: {0}")]
    NotFound(ProfileId),

    #[error("conditional commit lost to a concurrent writer")]
    Conflict,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable mapping from profile id to profile document and rating record.
///
/// The vote coordinator and the HTTP surface talk to the store only through
/// this trait; the handle is built once at startup and injected via the app
/// state. Two backends exist: [`PostgresStore`](crate::services::PostgresStore)
/// for production and [`MemoryStore`](crate::services::MemoryStore) for
/// development mode and tests.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Persist a submitted profile under a freshly assigned id with a
    /// default rating record (1500, zero matches, version 0).
    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile, StoreError>;

    /// Fetch the full profile document for display.
    async fn get_profile(&self, id: ProfileId) -> Result<Profile, StoreError>;

    /// Point lookup of the rating record plus its current version stamp.
    async fn get_rating(&self, id: ProfileId) -> Result<VersionedRating, StoreError>;

    /// Enumerate every profile id currently in the population.
    async fn all_profile_ids(&self) -> Result<Vec<ProfileId>, StoreError>;

    /// Conditionally write both rating records as one atomic unit.
    ///
    /// Each half carries the version the caller read; if either stored
    /// version has moved on (or the row is gone), nothing is written and the
    /// call fails with [`StoreError::Conflict`]. On success both versions
    /// advance by exactly 1. All-or-nothing under any failure, including
    /// request cancellation mid-commit: a record is never left with its
    /// rating changed but its match count not, or vice versa.
    ///
    /// Implementations apply the two writes in canonical id order so that
    /// overlapping concurrent commits cannot deadlock, and must not take any
    /// lock shared between commits touching disjoint profile pairs.
    async fn commit_pair(&self, first: RatingCommit, second: RatingCommit)
        -> Result<(), StoreError>;

    /// Unordered leaderboard rows for every profile; the leaderboard builder
    /// owns the ordering.
    ///
    /// Each row reflects its record at read time, not one point-in-time cut
    /// across the whole population: commits that land while the snapshot is
    /// being taken may or may not be visible in it.
    async fn snapshot(&self) -> Result<Vec<LeaderboardRow>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<bool, StoreError>;
}
