pub mod aggregation;

pub use aggregation::{overall_votes, windowed_votes, VoteQuery};
