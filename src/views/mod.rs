pub mod product;
pub mod votes;
