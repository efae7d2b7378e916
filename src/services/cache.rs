use std::time::Duration;

use moka::future::Cache;
use redis::aio::ConnectionManager;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{LeaderboardEntry, Profile, ProfileId};

/// Errors from the cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

const LEADERBOARD_KEY: &str = "leaderboard";

fn profile_key(id: ProfileId) -> String {
    format!("profile:{}", id)
}

/// Cache for derived read responses: the ranked leaderboard and profile
/// documents.
///
/// Two tiers share each entry: a small moka cache local to this instance
/// and Redis shared across instances, both bounded by the same TTL. Rating
/// state itself is never cached; it always comes from the store, so a stale
/// or dropped entry cannot affect a vote.
///
/// Reads and invalidations log backend failures and carry on. The cache is
/// an accelerator, not a source of truth: a Redis hiccup must not fail the
/// request that hit it, and a missed invalidation is bounded by the TTL.
pub struct SnapshotCache {
    redis: Mutex<ConnectionManager>,
    local: Cache<String, String>,
    ttl_secs: u64,
}

impl SnapshotCache {
    /// Connect the shared tier and size the local one. Fails only when
    /// Redis is unreachable at startup.
    pub async fn connect(
        redis_url: &str,
        local_capacity: u64,
        ttl_secs: u64,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let local = Cache::builder()
            .max_capacity(local_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Mutex::new(redis),
            local,
            ttl_secs,
        })
    }

    /// The cached ranked leaderboard, if still fresh.
    pub async fn leaderboard(&self) -> Option<Vec<LeaderboardEntry>> {
        self.read(LEADERBOARD_KEY).await
    }

    /// Cache a freshly built leaderboard for the TTL window.
    pub async fn store_leaderboard(&self, entries: &[LeaderboardEntry]) {
        self.write(LEADERBOARD_KEY, &entries).await;
    }

    /// A cached profile document, if still fresh.
    pub async fn profile(&self, id: ProfileId) -> Option<Profile> {
        self.read(&profile_key(id)).await
    }

    /// Cache one profile document under its own key.
    pub async fn store_profile(&self, profile: &Profile) {
        self.write(&profile_key(profile.profile_id), profile).await;
    }

    /// Drop everything a committed vote made stale: the global ranking and
    /// both participants' documents.
    pub async fn invalidate_vote(&self, subject: ProfileId, opponent: ProfileId) {
        self.evict(LEADERBOARD_KEY).await;
        self.evict(&profile_key(subject)).await;
        self.evict(&profile_key(opponent)).await;
    }

    /// Drop the cached ranking, e.g. after a new profile joins.
    pub async fn invalidate_leaderboard(&self) {
        self.evict(LEADERBOARD_KEY).await;
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.lookup(key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("cache read for {} failed: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                // An undecodable entry is treated as a miss and dropped so
                // the next write replaces it.
                tracing::warn!("evicting undecodable cache entry {}: {}", key, e);
                self.evict(key).await;
                None
            }
        }
    }

    /// Local tier first, then Redis; a shared hit warms the local tier.
    async fn lookup(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(json) = self.local.get(key).await {
            tracing::trace!("local cache hit: {}", key);
            return Ok(Some(json));
        }

        let mut conn = self.redis.lock().await;
        let shared: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        drop(conn);

        if let Some(json) = &shared {
            tracing::trace!("shared cache hit: {}", key);
            self.local.insert(key.to_string(), json.clone()).await;
        }
        Ok(shared)
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("cache encoding for {} failed: {}", key, e);
                return;
            }
        };

        self.local.insert(key.to_string(), json.clone()).await;

        let mut conn = self.redis.lock().await;
        let result = redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await;
        if let Err(e) = result {
            tracing::warn!("cache write for {} failed: {}", key, e);
        }
    }

    async fn evict(&self, key: &str) {
        self.local.invalidate(key).await;

        let mut conn = self.redis.lock().await;
        let result = redis::cmd("DEL").arg(key).query_async::<()>(&mut *conn).await;
        if let Err(e) = result {
            tracing::warn!("cache eviction for {} failed: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Education, RatingRecord};
    use uuid::Uuid;

    fn profile(id: ProfileId) -> Profile {
        Profile {
            profile_id: id,
            name: "Cached".to_string(),
            photo_url: "https://example.com/c.jpg".to_string(),
            experiences: vec![],
            education: Education {
                degree: "BS".to_string(),
                major: "Computer Science".to_string(),
                graduation_year: 2025,
            },
            linkedin_url: None,
            github_url: None,
            rating: RatingRecord::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_profile_keys_are_distinct_per_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(profile_key(a), profile_key(b));
        assert_eq!(
            profile_key(Uuid::nil()),
            "profile:00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_store_read_invalidate_profile() {
        let cache = SnapshotCache::connect("redis://127.0.0.1:6379", 100, 60)
            .await
            .expect("Failed to connect cache");

        let id = Uuid::new_v4();
        assert!(cache.profile(id).await.is_none());

        cache.store_profile(&profile(id)).await;
        let cached = cache.profile(id).await.expect("profile should be cached");
        assert_eq!(cached.profile_id, id);
        assert_eq!(cached.rating.rating, 1500);

        cache.invalidate_vote(id, Uuid::new_v4()).await;
        assert!(cache.profile(id).await.is_none());
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_vote_invalidation_clears_leaderboard() {
        let cache = SnapshotCache::connect("redis://127.0.0.1:6379", 100, 60)
            .await
            .expect("Failed to connect cache");

        cache.store_leaderboard(&[]).await;
        assert!(cache.leaderboard().await.is_some());

        cache.invalidate_vote(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(cache.leaderboard().await.is_none());
    }
}
