use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    LeaderboardRow, NewProfile, Profile, ProfileId, RatingCommit, RatingRecord, VersionedRating,
};
use crate::services::store::{RatingStore, StoreError};

struct StoredProfile {
    profile: Profile,
    version: i64,
}

/// In-process store backend, used for local development and tests.
///
/// Every profile sits behind its own lock, so commits on disjoint pairs run
/// in parallel; the outer map lock is only held long enough to look entries
/// up. `commit_pair` takes the two record locks in canonical id order, which
/// keeps overlapping pairs from deadlocking.
pub struct MemoryStore {
    profiles: RwLock<HashMap<ProfileId, Arc<RwLock<StoredProfile>>>>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    fn entry(&self, id: ProfileId) -> Result<Arc<RwLock<StoredProfile>>, StoreError> {
        let map = self.profiles.read().map_err(|_| poisoned())?;
        map.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, StoreError> {
        let profile = Profile {
            profile_id: Uuid::new_v4(),
            name: new.name,
            photo_url: new.photo_url,
            experiences: new.experiences,
            education: new.education,
            linkedin_url: new.linkedin_url,
            github_url: new.github_url,
            rating: RatingRecord::new(),
            created_at: Utc::now(),
        };

        let entry = Arc::new(RwLock::new(StoredProfile {
            profile: profile.clone(),
            version: 0,
        }));
        let mut map = self.profiles.write().map_err(|_| poisoned())?;
        map.insert(profile.profile_id, entry);
        Ok(profile)
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        let entry = self.entry(id)?;
        let stored = entry.read().map_err(|_| poisoned())?;
        Ok(stored.profile.clone())
    }

    async fn get_rating(&self, id: ProfileId) -> Result<VersionedRating, StoreError> {
        let entry = self.entry(id)?;
        let stored = entry.read().map_err(|_| poisoned())?;
        Ok(VersionedRating {
            record: stored.profile.rating,
            version: stored.version,
        })
    }

    async fn all_profile_ids(&self) -> Result<Vec<ProfileId>, StoreError> {
        let map = self.profiles.read().map_err(|_| poisoned())?;
        Ok(map.keys().copied().collect())
    }

    async fn commit_pair(&self, first: RatingCommit, second: RatingCommit) -> Result<(), StoreError> {
        if first.profile_id == second.profile_id {
            return Err(StoreError::Unavailable(
                "pair commit requires two distinct profiles".to_string(),
            ));
        }

        let (lo, hi) = if first.profile_id < second.profile_id {
            (first, second)
        } else {
            (second, first)
        };

        let lo_entry = self.entry(lo.profile_id)?;
        let hi_entry = self.entry(hi.profile_id)?;

        // Canonical id order: overlapping pairs always lock the shared
        // record from the same side.
        let mut lo_guard = lo_entry.write().map_err(|_| poisoned())?;
        let mut hi_guard = hi_entry.write().map_err(|_| poisoned())?;

        if lo_guard.version != lo.expected_version || hi_guard.version != hi.expected_version {
            return Err(StoreError::Conflict);
        }

        lo_guard.profile.rating = lo.record;
        lo_guard.version += 1;
        hi_guard.profile.rating = hi.record;
        hi_guard.version += 1;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<LeaderboardRow>, StoreError> {
        let map = self.profiles.read().map_err(|_| poisoned())?;
        let mut rows = Vec::with_capacity(map.len());
        for entry in map.values() {
            let stored = entry.read().map_err(|_| poisoned())?;
            rows.push(LeaderboardRow {
                profile_id: stored.profile.profile_id,
                name: stored.profile.name.clone(),
                photo_url: stored.profile.photo_url.clone(),
                rating: stored.profile.rating,
            });
        }
        Ok(rows)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Education;

    fn new_profile(name: &str) -> NewProfile {
        NewProfile {
            name: name.to_string(),
            photo_url: format!("https://example.com/{}.jpg", name),
            experiences: vec![],
            education: Education {
                degree: "BS".to_string(),
                major: "Computer Science".to_string(),
                graduation_year: 2025,
            },
            linkedin_url: None,
            github_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let store = MemoryStore::new();
        let created = store.insert_profile(new_profile("alice")).await.unwrap();

        let fetched = store.get_profile(created.profile_id).await.unwrap();
        assert_eq!(fetched.name, "alice");
        assert_eq!(fetched.rating.rating, 1500);
        assert_eq!(fetched.rating.match_count, 0);

        let versioned = store.get_rating(created.profile_id).await.unwrap();
        assert_eq!(versioned.version, 0);
        assert_eq!(versioned.record, RatingRecord::new());
    }

    #[tokio::test]
    async fn test_get_unknown_profile() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.get_profile(id).await.unwrap_err(),
            StoreError::NotFound(missing) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_commit_pair_bumps_both_versions() {
        let store = MemoryStore::new();
        let a = store.insert_profile(new_profile("a")).await.unwrap();
        let b = store.insert_profile(new_profile("b")).await.unwrap();

        let commit_a = RatingCommit {
            profile_id: a.profile_id,
            expected_version: 0,
            record: RatingRecord { rating: 1516, match_count: 1 },
        };
        let commit_b = RatingCommit {
            profile_id: b.profile_id,
            expected_version: 0,
            record: RatingRecord { rating: 1484, match_count: 1 },
        };
        store.commit_pair(commit_a, commit_b).await.unwrap();

        let a_after = store.get_rating(a.profile_id).await.unwrap();
        let b_after = store.get_rating(b.profile_id).await.unwrap();
        assert_eq!(a_after.version, 1);
        assert_eq!(b_after.version, 1);
        assert_eq!(a_after.record.rating, 1516);
        assert_eq!(b_after.record.rating, 1484);
    }

    #[tokio::test]
    async fn test_commit_pair_argument_order_does_not_matter() {
        let store = MemoryStore::new();
        let a = store.insert_profile(new_profile("a")).await.unwrap();
        let b = store.insert_profile(new_profile("b")).await.unwrap();

        // Pass the commits in whichever order; locking is canonical inside.
        let commit_a = RatingCommit {
            profile_id: a.profile_id,
            expected_version: 0,
            record: RatingRecord { rating: 1490, match_count: 1 },
        };
        let commit_b = RatingCommit {
            profile_id: b.profile_id,
            expected_version: 0,
            record: RatingRecord { rating: 1510, match_count: 1 },
        };
        store.commit_pair(commit_b, commit_a).await.unwrap();

        assert_eq!(store.get_rating(a.profile_id).await.unwrap().record.rating, 1490);
        assert_eq!(store.get_rating(b.profile_id).await.unwrap().record.rating, 1510);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts_and_writes_nothing() {
        let store = MemoryStore::new();
        let a = store.insert_profile(new_profile("a")).await.unwrap();
        let b = store.insert_profile(new_profile("b")).await.unwrap();

        let fresh = |id, version, rating| RatingCommit {
            profile_id: id,
            expected_version: version,
            record: RatingRecord { rating, match_count: 1 },
        };

        // First writer wins.
        store
            .commit_pair(fresh(a.profile_id, 0, 1516), fresh(b.profile_id, 0, 1484))
            .await
            .unwrap();

        // Second writer still holds version 0 for `a` and must lose, even
        // though its `b` expectation is refreshed.
        let err = store
            .commit_pair(fresh(a.profile_id, 0, 1532), fresh(b.profile_id, 1, 1468))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));

        // The losing commit left no trace on either record.
        let a_after = store.get_rating(a.profile_id).await.unwrap();
        let b_after = store.get_rating(b.profile_id).await.unwrap();
        assert_eq!(a_after.record.rating, 1516);
        assert_eq!(a_after.version, 1);
        assert_eq!(b_after.record.rating, 1484);
        assert_eq!(b_after.version, 1);
    }

    #[tokio::test]
    async fn test_commit_pair_unknown_profile() {
        let store = MemoryStore::new();
        let a = store.insert_profile(new_profile("a")).await.unwrap();
        let ghost = Uuid::new_v4();

        let commit_a = RatingCommit {
            profile_id: a.profile_id,
            expected_version: 0,
            record: RatingRecord::new(),
        };
        let commit_ghost = RatingCommit {
            profile_id: ghost,
            expected_version: 0,
            record: RatingRecord::new(),
        };
        let err = store.commit_pair(commit_a, commit_ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn test_snapshot_includes_every_profile() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.insert_profile(new_profile(name)).await.unwrap();
        }

        let rows = store.snapshot().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.rating.rating == 1500));
    }
}
