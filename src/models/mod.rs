// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Education, Experience, LeaderboardRow, NewProfile, Outcome, Profile, ProfileId, RatingCommit,
    RatingRecord, VersionedRating, INITIAL_RATING,
};
pub use requests::{CreateProfileRequest, LeaderboardQuery, RecordVoteRequest};
pub use responses::{
    ErrorResponse, HealthResponse, LeaderboardEntry, LeaderboardResponse, PairResponse,
    VoteResponse,
};
