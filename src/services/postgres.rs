use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    LeaderboardRow, NewProfile, Profile, ProfileId, RatingCommit, RatingRecord, VersionedRating,
};
use crate::services::store::{RatingStore, StoreError};

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn corrupt(err: serde_json::Error) -> StoreError {
    StoreError::Unavailable(format!("corrupt profile row: {}", err))
}

/// PostgreSQL-backed store
///
/// Rating state lives in the `profiles` table together with the profile
/// document; each row carries a `version` column that conditional commits
/// compare and bump. Migrations run once at connect time.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect a pool and bring the schema up to date.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await
            .map_err(db_error)?;

        // Run migrations on startup
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(Self { pool })
    }

    fn profile_from_row(row: &PgRow) -> Result<Profile, StoreError> {
        let experiences: serde_json::Value = row.get("experiences");
        let education: serde_json::Value = row.get("education");

        Ok(Profile {
            profile_id: row.get("profile_id"),
            name: row.get("name"),
            photo_url: row.get("photo_url"),
            experiences: serde_json::from_value(experiences).map_err(corrupt)?,
            education: serde_json::from_value(education).map_err(corrupt)?,
            linkedin_url: row.get("linkedin_url"),
            github_url: row.get("github_url"),
            rating: RatingRecord {
                rating: row.get("rating"),
                match_count: row.get::<i64, _>("match_count") as u64,
            },
            created_at: row.get("created_at"),
        })
    }

    /// Remove every profile. Used by the seed tool to start from a clean
    /// slate before inserting its fixture set.
    pub async fn clear_profiles(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM profiles")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        tracing::info!("Cleared {} profiles", result.rows_affected());

        Ok(result.rows_affected())
    }

    /// A conditional update that touched no row is either a lost version
    /// race or a profile that no longer exists; tell them apart after the
    /// transaction has been rolled back.
    async fn classify_failed_commit(&self, id: ProfileId) -> StoreError {
        let probe = sqlx::query("SELECT 1 FROM profiles WHERE profile_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        match probe {
            Ok(Some(_)) => StoreError::Conflict,
            Ok(None) => StoreError::NotFound(id),
            Err(err) => db_error(err),
        }
    }
}

#[async_trait]
impl RatingStore for PostgresStore {
    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, StoreError> {
        let profile_id = Uuid::new_v4();
        let experiences =
            serde_json::to_value(&new.experiences).map_err(corrupt)?;
        let education = serde_json::to_value(&new.education).map_err(corrupt)?;

        let query = r#"
            INSERT INTO profiles
                (profile_id, name, photo_url, experiences, education,
                 linkedin_url, github_url, rating, match_count, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0)
            RETURNING created_at
        "#;

        let row = sqlx::query(query)
            .bind(profile_id)
            .bind(&new.name)
            .bind(&new.photo_url)
            .bind(&experiences)
            .bind(&education)
            .bind(&new.linkedin_url)
            .bind(&new.github_url)
            .bind(crate::models::INITIAL_RATING)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        tracing::debug!("Inserted profile {} ({})", profile_id, new.name);

        Ok(Profile {
            profile_id,
            name: new.name,
            photo_url: new.photo_url,
            experiences: new.experiences,
            education: new.education,
            linkedin_url: new.linkedin_url,
            github_url: new.github_url,
            rating: RatingRecord::new(),
            created_at: row.get("created_at"),
        })
    }

    async fn get_profile(&self, id: ProfileId) -> Result<Profile, StoreError> {
        let query = r#"
            SELECT profile_id, name, photo_url, experiences, education,
                   linkedin_url, github_url, rating, match_count, created_at
            FROM profiles
            WHERE profile_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(StoreError::NotFound(id))?;

        Self::profile_from_row(&row)
    }

    async fn get_rating(&self, id: ProfileId) -> Result<VersionedRating, StoreError> {
        let query = r#"
            SELECT rating, match_count, version
            FROM profiles
            WHERE profile_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(StoreError::NotFound(id))?;

        Ok(VersionedRating {
            record: RatingRecord {
                rating: row.get("rating"),
                match_count: row.get::<i64, _>("match_count") as u64,
            },
            version: row.get("version"),
        })
    }

    async fn all_profile_ids(&self) -> Result<Vec<ProfileId>, StoreError> {
        let rows = sqlx::query("SELECT profile_id FROM profiles")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(|row| row.get("profile_id")).collect())
    }

    async fn commit_pair(&self, first: RatingCommit, second: RatingCommit) -> Result<(), StoreError> {
        if first.profile_id == second.profile_id {
            return Err(StoreError::Unavailable(
                "pair commit requires two distinct profiles".to_string(),
            ));
        }

        // Update in canonical id order so concurrent commits on overlapping
        // pairs take row locks in the same order.
        let (lo, hi) = if first.profile_id < second.profile_id {
            (first, second)
        } else {
            (second, first)
        };

        let query = r#"
            UPDATE profiles
            SET rating = $1, match_count = $2, version = version + 1
            WHERE profile_id = $3 AND version = $4
        "#;

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for commit in [lo, hi] {
            let result = sqlx::query(query)
                .bind(commit.record.rating)
                .bind(commit.record.match_count as i64)
                .bind(commit.profile_id)
                .bind(commit.expected_version)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;

            if result.rows_affected() == 0 {
                tx.rollback().await.map_err(db_error)?;
                return Err(self.classify_failed_commit(commit.profile_id).await);
            }
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<LeaderboardRow>, StoreError> {
        // No ORDER BY here: ranking order is the leaderboard builder's job.
        let rows = sqlx::query("SELECT profile_id, name, photo_url, rating, match_count FROM profiles")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows
            .iter()
            .map(|row| LeaderboardRow {
                profile_id: row.get("profile_id"),
                name: row.get("name"),
                photo_url: row.get("photo_url"),
                rating: RatingRecord {
                    rating: row.get("rating"),
                    match_count: row.get::<i64, _>("match_count") as u64,
                },
            })
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_maps_to_unavailable() {
        let err = db_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
