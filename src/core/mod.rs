// Core engine exports
pub mod elo;
pub mod leaderboard;
pub mod sampler;
pub mod vote;

pub use elo::{expected_score, update, DEFAULT_K_FACTOR};
pub use leaderboard::build_leaderboard;
pub use sampler::{sample_pair, SampleError};
pub use vote::{VoteCoordinator, VoteError, VoteReceipt};
