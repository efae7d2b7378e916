use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{build_leaderboard, sample_pair, VoteCoordinator, VoteError};
use crate::models::{
    CreateProfileRequest, ErrorResponse, HealthResponse, LeaderboardEntry, LeaderboardQuery,
    LeaderboardResponse, PairResponse, ProfileId, RecordVoteRequest, VoteResponse,
};
use crate::services::{RatingStore, SnapshotCache, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RatingStore>,
    pub cache: Arc<SnapshotCache>,
    pub coordinator: Arc<VoteCoordinator>,
}

/// Configure all profile and voting routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // `/profiles/random` must register before the `{id}` capture.
    cfg.route("/health", web::get().to(health_check))
        .route("/profiles", web::post().to(create_profile))
        .route("/profiles/random", web::get().to(random_pair))
        .route("/profiles/{id}", web::get().to(get_profile))
        .route("/votes", web::post().to(record_vote))
        .route("/leaderboard", web::get().to(leaderboard));
}

fn store_error_response(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Profile not found".to_string(),
            message: format!("no profile with id {}", id),
            status_code: 404,
        }),
        StoreError::Conflict => HttpResponse::Conflict().json(ErrorResponse {
            error: "Conflict".to_string(),
            message: "the record changed under a concurrent writer".to_string(),
            status_code: 409,
        }),
        StoreError::Unavailable(message) => HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "Store unavailable".to_string(),
            message,
            status_code: 503,
        }),
    }
}

fn vote_error_response(err: VoteError) -> HttpResponse {
    match err {
        VoteError::UnknownProfile(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Unknown profile".to_string(),
            message: format!("no profile with id {}", id),
            status_code: 404,
        }),
        VoteError::SelfMatch(id) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Self match".to_string(),
            message: format!("profile {} cannot be matched against itself", id),
            status_code: 400,
        }),
        VoteError::InvalidOutcome(score) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid outcome".to_string(),
            message: format!("outcome must be 0, 0.5 or 1, got {}", score),
            status_code: 400,
        }),
        VoteError::Conflict { attempts } => HttpResponse::Conflict().json(ErrorResponse {
            error: "Vote contended".to_string(),
            message: format!("commit lost {} version race(s); retry the vote", attempts),
            status_code: 409,
        }),
        VoteError::Unavailable(message) => HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "Store unavailable".to_string(),
            message,
            status_code: 503,
        }),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Submit a new profile
///
/// POST /api/v1/profiles
///
/// The new profile starts at rating 1500 with zero matches played.
async fn create_profile(
    state: web::Data<AppState>,
    req: web::Json<CreateProfileRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_profile request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.store.insert_profile(req.into_inner().into()).await {
        Ok(profile) => {
            tracing::info!("Created profile {} ({})", profile.profile_id, profile.name);

            // A new profile changes the leaderboard.
            state.cache.invalidate_leaderboard().await;

            HttpResponse::Created().json(profile)
        }
        Err(e) => {
            tracing::error!("Failed to create profile: {}", e);
            store_error_response(e)
        }
    }
}

/// Random pair endpoint
///
/// GET /api/v1/profiles/random
///
/// Draws two distinct profiles uniformly from the whole population,
/// independently of their ratings.
async fn random_pair(state: web::Data<AppState>) -> impl Responder {
    let ids = match state.store.all_profile_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!("Failed to list profiles for pairing: {}", e);
            return store_error_response(e);
        }
    };

    let (first_id, second_id) = match sample_pair(&ids) {
        Ok(pair) => pair,
        Err(e) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Not enough profiles".to_string(),
                message: e.to_string(),
                status_code: 404,
            });
        }
    };

    let first = match state.store.get_profile(first_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch paired profile {}: {}", first_id, e);
            return store_error_response(e);
        }
    };
    let second = match state.store.get_profile(second_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch paired profile {}: {}", second_id, e);
            return store_error_response(e);
        }
    };

    HttpResponse::Ok().json(PairResponse {
        profiles: [first, second],
    })
}

/// Fetch one profile
///
/// GET /api/v1/profiles/{id}
async fn get_profile(state: web::Data<AppState>, path: web::Path<ProfileId>) -> impl Responder {
    let id = path.into_inner();

    // Serve the cached document when fresh.
    if let Some(profile) = state.cache.profile(id).await {
        return HttpResponse::Ok().json(profile);
    }

    match state.store.get_profile(id).await {
        Ok(profile) => {
            state.cache.store_profile(&profile).await;
            HttpResponse::Ok().json(profile)
        }
        Err(e) => {
            tracing::error!("Failed to fetch profile {}: {}", id, e);
            store_error_response(e)
        }
    }
}

/// Record a vote between two profiles
///
/// POST /api/v1/votes
///
/// Request body:
/// ```json
/// {
///   "subjectId": "uuid",
///   "opponentId": "uuid",
///   "outcome": 1.0
/// }
/// ```
async fn record_vote(
    state: web::Data<AppState>,
    req: web::Json<RecordVoteRequest>,
) -> impl Responder {
    let req = req.into_inner();

    match state
        .coordinator
        .record_vote(req.subject_id, req.opponent_id, req.outcome)
        .await
    {
        Ok(receipt) => {
            // Both documents plus the leaderboard changed under this vote.
            state
                .cache
                .invalidate_vote(receipt.subject_id, receipt.opponent_id)
                .await;

            HttpResponse::Ok().json(VoteResponse {
                subject_id: receipt.subject_id,
                opponent_id: receipt.opponent_id,
                subject: receipt.subject,
                opponent: receipt.opponent,
            })
        }
        Err(e) => {
            tracing::error!(
                "Vote between {} and {} failed: {}",
                req.subject_id,
                req.opponent_id,
                e
            );
            vote_error_response(e)
        }
    }
}

/// Leaderboard endpoint
///
/// GET /api/v1/leaderboard?limit=10
///
/// Profiles ranked by rating descending; ties broken by match count
/// descending, then by profile id. The full ranking is cached and the
/// limit applied per request, clamped to 1..=100.
async fn leaderboard(
    state: web::Data<AppState>,
    query: web::Query<LeaderboardQuery>,
) -> impl Responder {
    let limit = clamp_limit(query.limit);

    let entries: Vec<LeaderboardEntry> = match state.cache.leaderboard().await {
        Some(entries) => entries,
        None => {
            let rows = match state.store.snapshot().await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!("Failed to read leaderboard snapshot: {}", e);
                    return store_error_response(e);
                }
            };

            let entries: Vec<LeaderboardEntry> = build_leaderboard(rows)
                .into_iter()
                .enumerate()
                .map(|(index, row)| LeaderboardEntry {
                    rank: index + 1,
                    profile_id: row.profile_id,
                    name: row.name,
                    photo_url: row.photo_url,
                    rating: row.rating,
                })
                .collect();

            state.cache.store_leaderboard(&entries).await;

            entries
        }
    };

    let total_profiles = entries.len();
    let entries: Vec<LeaderboardEntry> = entries.into_iter().take(limit).collect();

    HttpResponse::Ok().json(LeaderboardResponse {
        entries,
        total_profiles,
    })
}

/// Entry budget for one leaderboard response. A limit of 0 would return an
/// empty board that looks like an empty population, so the floor is 1; the
/// cap keeps responses bounded.
fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn test_vote_error_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            vote_error_response(VoteError::SelfMatch(id)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            vote_error_response(VoteError::InvalidOutcome(0.25)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            vote_error_response(VoteError::UnknownProfile(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            vote_error_response(VoteError::Conflict { attempts: 3 }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            vote_error_response(VoteError::Unavailable("down".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_leaderboard_limit_clamped_to_valid_range() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(1), 1);
        assert_eq!(clamp_limit(10), 10);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(5000), 100);
    }

    #[test]
    fn test_store_error_status_codes() {
        assert_eq!(
            store_error_response(StoreError::NotFound(Uuid::new_v4())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            store_error_response(StoreError::Conflict).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            store_error_response(StoreError::Unavailable("down".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
