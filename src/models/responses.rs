use serde::{Deserialize, Serialize};

use crate::models::domain::{Profile, ProfileId, RatingRecord};

/// Response for the random pair endpoint: two distinct profiles to compare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResponse {
    pub profiles: [Profile; 2],
}

/// Response after a recorded vote: both updated rating records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    #[serde(rename = "subjectId")]
    pub subject_id: ProfileId,
    #[serde(rename = "opponentId")]
    pub opponent_id: ProfileId,
    pub subject: RatingRecord,
    pub opponent: RatingRecord,
}

/// One ranked leaderboard entry; rank is the 1-based position in the
/// total order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(rename = "profileId")]
    pub profile_id: ProfileId,
    pub name: String,
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
    #[serde(flatten)]
    pub rating: RatingRecord,
}

/// Leaderboard response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    #[serde(rename = "totalProfiles")]
    pub total_profiles: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
