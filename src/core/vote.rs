use std::sync::Arc;

use thiserror::Error;

use crate::core::elo;
use crate::models::{Outcome, ProfileId, RatingCommit, RatingRecord};
use crate::services::{RatingStore, StoreError};

/// Errors from recording a vote
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("unknown profile: {0}")]
    UnknownProfile(ProfileId),

    #[error("profile {0} cannot be matched against itself")]
    SelfMatch(ProfileId),

    #[error("invalid outcome score {0}; expected 0, 0.5 or 1")]
    InvalidOutcome(f64),

    #[error("vote commit still contended after {attempts} attempt(s)")]
    Conflict { attempts: u32 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Map a failed point read. Reads are unconditional, so a version conflict
/// cannot come from here; only the commit reports `Conflict`, and
/// `record_vote` matches that arm explicitly to drive its retry loop.
fn read_error(err: StoreError) -> VoteError {
    match err {
        StoreError::NotFound(id) => VoteError::UnknownProfile(id),
        StoreError::Unavailable(message) => VoteError::Unavailable(message),
        StoreError::Conflict => {
            VoteError::Unavailable("unexpected version conflict from a point read".to_string())
        }
    }
}

/// Both new rating records after a successfully committed vote.
#[derive(Debug, Clone, Copy)]
pub struct VoteReceipt {
    pub subject_id: ProfileId,
    pub opponent_id: ProfileId,
    pub subject: RatingRecord,
    pub opponent: RatingRecord,
}

/// Orchestrates the lifecycle of one pairwise comparison.
///
/// One coordinator is built at startup and shared by every in-flight vote
/// request; all of its state is immutable, so concurrent calls only contend
/// inside the store's conditional commit.
pub struct VoteCoordinator {
    store: Arc<dyn RatingStore>,
    k_factor: f64,
    max_attempts: u32,
}

impl VoteCoordinator {
    /// `max_attempts` bounds the read-compute-commit retries on version
    /// conflict; values below 1 are treated as 1.
    pub fn new(store: Arc<dyn RatingStore>, k_factor: f64, max_attempts: u32) -> Self {
        Self {
            store,
            k_factor,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Record one vote: `outcome_score` is the subject's result (0 loss,
    /// 0.5 draw, 1 win); the opponent always scores the complement.
    ///
    /// Validation happens before any store access: a self-match or an
    /// outcome outside {0, 0.5, 1} never touches the store. Both rating
    /// records are read with their version stamps, new ratings are computed
    /// from the ratings as read, and both `(rating, match_count + 1)` pairs
    /// are committed as one atomic conditional write.
    ///
    /// A `Conflict` from the commit means a concurrent vote moved one of the
    /// records first and nothing was written; the whole read-compute-commit
    /// cycle is retried up to `max_attempts` times before surfacing.
    /// `Unavailable` surfaces immediately and is never retried here: the
    /// commit may or may not have landed, and an internal retry could apply
    /// the vote twice. Callers get all-or-nothing either way.
    pub async fn record_vote(
        &self,
        subject_id: ProfileId,
        opponent_id: ProfileId,
        outcome_score: f64,
    ) -> Result<VoteReceipt, VoteError> {
        if subject_id == opponent_id {
            return Err(VoteError::SelfMatch(subject_id));
        }
        let outcome = Outcome::from_score(outcome_score)
            .ok_or(VoteError::InvalidOutcome(outcome_score))?;

        let mut attempts = 0;
        while attempts < self.max_attempts {
            attempts += 1;

            let current_subject = self
                .store
                .get_rating(subject_id)
                .await
                .map_err(read_error)?;
            let current_opponent = self
                .store
                .get_rating(opponent_id)
                .await
                .map_err(read_error)?;

            let (new_subject, new_opponent) = elo::update(
                current_subject.record.rating,
                current_opponent.record.rating,
                outcome,
                self.k_factor,
            );

            let subject = RatingRecord {
                rating: new_subject,
                match_count: current_subject.record.match_count + 1,
            };
            let opponent = RatingRecord {
                rating: new_opponent,
                match_count: current_opponent.record.match_count + 1,
            };

            let commit = self
                .store
                .commit_pair(
                    RatingCommit {
                        profile_id: subject_id,
                        expected_version: current_subject.version,
                        record: subject,
                    },
                    RatingCommit {
                        profile_id: opponent_id,
                        expected_version: current_opponent.version,
                        record: opponent,
                    },
                )
                .await;

            match commit {
                Ok(()) => {
                    tracing::debug!(
                        "vote committed: {} {:?} vs {} ({} -> {}, {} -> {})",
                        subject_id,
                        outcome,
                        opponent_id,
                        current_subject.record.rating,
                        subject.rating,
                        current_opponent.record.rating,
                        opponent.rating,
                    );
                    return Ok(VoteReceipt {
                        subject_id,
                        opponent_id,
                        subject,
                        opponent,
                    });
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(
                        "vote commit conflicted (attempt {}/{}), re-reading {} and {}",
                        attempts,
                        self.max_attempts,
                        subject_id,
                        opponent_id,
                    );
                    continue;
                }
                // A row vanishing between the read and the commit means the
                // profile is gone, not that the vote is contended.
                Err(StoreError::NotFound(id)) => return Err(VoteError::UnknownProfile(id)),
                Err(StoreError::Unavailable(message)) => {
                    return Err(VoteError::Unavailable(message))
                }
            }
        }

        tracing::warn!(
            "vote between {} and {} gave up after {} contended attempt(s)",
            subject_id,
            opponent_id,
            attempts,
        );
        Err(VoteError::Conflict { attempts })
    }

    /// K-factor this coordinator applies to every update.
    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }
}
