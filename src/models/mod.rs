mod admin;
mod product;
pub mod rating;
mod votes;

pub use admin::*;
pub use product::*;
pub use rating::{normalize_comment, RatingEvent, RatingValue};
pub use votes::*;
