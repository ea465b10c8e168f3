pub mod memory;
pub mod postgres;

pub use memory::InMemoryProductRepository;
pub use postgres::PgProductRepository;

use crate::errors::RatingError;
use crate::models::{normalize_comment, Product, RatingValue, Votes};
use crate::services::VoteQuery;
use std::convert::TryFrom;

/// Owns the products, their tallies and comment logs, and the rating history.
///
/// Implementations serialize `create`, `delete` and `record` per product id and
/// never expose a product whose tally and comments disagree.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product with an empty tally. Fails with `DuplicateId` when taken.
    async fn create(&self, id: i32, name: String) -> Result<Product, RatingError>;

    async fn get(&self, id: i32) -> Result<Product, RatingError>;

    /// Products in insertion order.
    async fn list(&self) -> Result<Vec<Product>, RatingError>;

    /// Membership check that loads neither tally nor comments.
    async fn exists(&self, id: i32) -> Result<bool, RatingError>;

    /// Removes the product. Past rating events are kept for windowed votes.
    async fn delete(&self, id: i32) -> Result<(), RatingError>;

    /// Counts one already validated vote and appends its comment.
    async fn record(
        &self,
        id: i32,
        rating: RatingValue,
        comment: String,
    ) -> Result<Product, RatingError>;

    async fn votes(&self, query: VoteQuery) -> Result<Votes, RatingError>;

    /// Validates a raw rating and comment, then records them. An unknown
    /// product is reported as `NotFound` even when the rating is invalid too.
    async fn record_rating(
        &self,
        id: i32,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Product, RatingError> {
        let rating = match RatingValue::try_from(rating) {
            Ok(rating) => rating,
            Err(err) => {
                if !self.exists(id).await? {
                    return Err(RatingError::NotFound(id));
                }
                return Err(err);
            }
        };
        self.record(id, rating, normalize_comment(comment)).await
    }
}
