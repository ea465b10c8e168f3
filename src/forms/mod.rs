mod product;
mod rating;
mod votes;

pub use product::*;
pub use rating::*;
pub use votes::*;
