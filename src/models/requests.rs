use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Education, Experience, NewProfile, ProfileId};

/// Request to submit a new profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(url)]
    #[serde(alias = "photo_url", rename = "photoUrl")]
    pub photo_url: String,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    pub education: Education,
    #[validate(url)]
    #[serde(alias = "linkedin_url", rename = "linkedinUrl", default)]
    pub linkedin_url: Option<String>,
    #[validate(url)]
    #[serde(alias = "github_url", rename = "githubUrl", default)]
    pub github_url: Option<String>,
}

impl From<CreateProfileRequest> for NewProfile {
    fn from(request: CreateProfileRequest) -> Self {
        NewProfile {
            name: request.name,
            photo_url: request.photo_url,
            experiences: request.experiences,
            education: request.education,
            linkedin_url: request.linkedin_url,
            github_url: request.github_url,
        }
    }
}

/// Request to record one pairwise comparison
///
/// `outcome` is the subject's score: 0 for a loss, 0.5 for a draw, 1 for a
/// win. Exactness is checked by the vote coordinator, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordVoteRequest {
    #[serde(alias = "subject_id", rename = "subjectId")]
    pub subject_id: ProfileId,
    #[serde(alias = "opponent_id", rename = "opponentId")]
    pub opponent_id: ProfileId,
    pub outcome: f64,
}

/// Query parameters for the leaderboard endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    pub limit: usize,
}

fn default_leaderboard_limit() -> usize {
    10
}
