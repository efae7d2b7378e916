use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque profile identifier, assigned at creation and immutable afterwards.
pub type ProfileId = Uuid;

/// Rating state for one profile.
///
/// Both fields move together: a vote that changes `rating` also increments
/// `match_count`, in the same commit. Negative ratings are legitimate
/// outputs of the update formula and are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub rating: i32,
    #[serde(rename = "matchCount")]
    pub match_count: u64,
}

/// Every new profile starts here.
pub const INITIAL_RATING: i32 = 1500;

impl RatingRecord {
    /// A fresh record: rating 1500, zero matches played.
    pub fn new() -> Self {
        Self {
            rating: INITIAL_RATING,
            match_count: 0,
        }
    }
}

impl Default for RatingRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one pairwise comparison, from the subject's point of view.
///
/// The opponent's outcome is always the complement: `1 - score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Loss,
    Draw,
    Win,
}

impl Outcome {
    /// Parse the wire representation. Only 0, 0.5 and 1 are valid scores;
    /// all three are exactly representable, so exact comparison is safe.
    pub fn from_score(score: f64) -> Option<Self> {
        if score == 0.0 {
            Some(Outcome::Loss)
        } else if score == 0.5 {
            Some(Outcome::Draw)
        } else if score == 1.0 {
            Some(Outcome::Win)
        } else {
            None
        }
    }

    /// Numeric score used by the rating formula.
    pub fn score(&self) -> f64 {
        match self {
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
            Outcome::Win => 1.0,
        }
    }

    /// The same comparison seen from the other side.
    pub fn inverted(&self) -> Self {
        match self {
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
            Outcome::Win => Outcome::Loss,
        }
    }
}

/// A rating record together with its store version stamp.
///
/// The version is compared at commit time to detect concurrent writers; it
/// increments by exactly 1 on every successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedRating {
    pub record: RatingRecord,
    pub version: i64,
}

/// One half of an atomic two-record commit: the new record for a profile,
/// conditional on the version the coordinator read.
#[derive(Debug, Clone, Copy)]
pub struct RatingCommit {
    pub profile_id: ProfileId,
    pub expected_version: i64,
    pub record: RatingRecord,
}

/// A single work experience entry on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub description: String,
}

/// Education summary on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub major: String,
    #[serde(rename = "graduationYear")]
    pub graduation_year: i32,
}

/// Full profile document as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "profileId")]
    pub profile_id: ProfileId,
    pub name: String,
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    pub education: Education,
    #[serde(rename = "linkedinUrl", default)]
    pub linkedin_url: Option<String>,
    #[serde(rename = "githubUrl", default)]
    pub github_url: Option<String>,
    #[serde(flatten)]
    pub rating: RatingRecord,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Profile content as submitted, before the store assigns an id and a
/// fresh rating record.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub photo_url: String,
    pub experiences: Vec<Experience>,
    pub education: Education,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
}

/// Unordered leaderboard input row as read from the store.
///
/// Ordering is applied by the leaderboard builder, not here and not in SQL,
/// so the tie-break rule lives in exactly one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    #[serde(rename = "profileId")]
    pub profile_id: ProfileId,
    pub name: String,
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
    #[serde(flatten)]
    pub rating: RatingRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rating_record_defaults() {
        let record = RatingRecord::new();
        assert_eq!(record.rating, 1500);
        assert_eq!(record.match_count, 0);
        assert_eq!(record, RatingRecord::default());
    }

    #[test]
    fn test_outcome_parsing() {
        assert_eq!(Outcome::from_score(0.0), Some(Outcome::Loss));
        assert_eq!(Outcome::from_score(0.5), Some(Outcome::Draw));
        assert_eq!(Outcome::from_score(1.0), Some(Outcome::Win));
        assert_eq!(Outcome::from_score(0.75), None);
        assert_eq!(Outcome::from_score(-1.0), None);
        assert_eq!(Outcome::from_score(f64::NAN), None);
    }

    #[test]
    fn test_outcome_inversion() {
        assert_eq!(Outcome::Win.inverted(), Outcome::Loss);
        assert_eq!(Outcome::Loss.inverted(), Outcome::Win);
        assert_eq!(Outcome::Draw.inverted(), Outcome::Draw);
        for outcome in [Outcome::Loss, Outcome::Draw, Outcome::Win] {
            assert_eq!(outcome.score() + outcome.inverted().score(), 1.0);
        }
    }

    #[test]
    fn test_profile_serializes_rating_inline() {
        let profile = Profile {
            profile_id: Uuid::nil(),
            name: "Test".to_string(),
            photo_url: "https://example.com/p.jpg".to_string(),
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
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["rating"], 1500);
        assert_eq!(json["matchCount"], 0);
        assert_eq!(json["education"]["graduationYear"], 2025);
    }
}
