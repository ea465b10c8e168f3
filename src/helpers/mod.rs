pub(crate) mod json;
pub(crate) mod timestamp;

pub use json::*;
pub use timestamp::parse_timestamp;
