use crate::db::ProductRepository;
use crate::errors::RatingError;
use crate::models::{Product, RatingEvent, RatingValue, Tally, Votes, TIMESTAMP_DIGITS};
use crate::services::{overall_votes, windowed_votes, VoteQuery};
use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-local repository.
///
/// The outer lock guards membership: `create` and `delete` take it for writing,
/// everything else for reading. Each product sits behind its own lock, so votes
/// on different products proceed in parallel while two votes on the same
/// product are applied one after the other.
pub struct InMemoryProductRepository {
    products: RwLock<IndexMap<i32, Arc<RwLock<Product>>>>,
    events: RwLock<Vec<RatingEvent>>,
    clock: Clock,
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            products: RwLock::new(IndexMap::new()),
            events: RwLock::new(vec![]),
            clock,
        }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[tracing::instrument(name = "Create product in memory.", skip(self))]
    async fn create(&self, id: i32, name: String) -> Result<Product, RatingError> {
        let mut products = self.products.write().await;
        if products.contains_key(&id) {
            return Err(RatingError::DuplicateId(id));
        }

        let product = Product::new(id, name);
        products.insert(id, Arc::new(RwLock::new(product.clone())));
        tracing::info!("Product {} created", id);
        Ok(product)
    }

    async fn get(&self, id: i32) -> Result<Product, RatingError> {
        let products = self.products.read().await;
        let product = products.get(&id).ok_or(RatingError::NotFound(id))?;
        let product = product.read().await;
        Ok(product.clone())
    }

    async fn list(&self) -> Result<Vec<Product>, RatingError> {
        let products = self.products.read().await;
        let mut result = Vec::with_capacity(products.len());
        for product in products.values() {
            result.push(product.read().await.clone());
        }
        Ok(result)
    }

    async fn exists(&self, id: i32) -> Result<bool, RatingError> {
        Ok(self.products.read().await.contains_key(&id))
    }

    #[tracing::instrument(name = "Delete product from memory.", skip(self))]
    async fn delete(&self, id: i32) -> Result<(), RatingError> {
        let mut products = self.products.write().await;
        products
            .shift_remove(&id)
            .map(|_| tracing::info!("Product {} deleted", id))
            .ok_or(RatingError::NotFound(id))
    }

    #[tracing::instrument(name = "Record rating in memory.", skip(self, comment))]
    async fn record(
        &self,
        id: i32,
        rating: RatingValue,
        comment: String,
    ) -> Result<Product, RatingError> {
        // held for reading until the vote is applied so a concurrent delete waits
        let products = self.products.read().await;
        let product = products.get(&id).ok_or(RatingError::NotFound(id))?;
        let mut product = product.write().await;

        self.events.write().await.push(RatingEvent {
            product_id: id,
            rating,
            comment: comment.clone(),
            created_at: (self.clock)().trunc_subsecs(TIMESTAMP_DIGITS),
        });
        product.rate(rating, comment);

        Ok(product.clone())
    }

    async fn votes(&self, query: VoteQuery) -> Result<Votes, RatingError> {
        match query {
            VoteQuery::Overall => {
                let products = self.products.read().await;
                let mut tallies: Vec<Tally> = Vec::with_capacity(products.len());
                for product in products.values() {
                    tallies.push(product.read().await.ratings);
                }
                Ok(overall_votes(&tallies))
            }
            VoteQuery::Window(window) => {
                let events = self.events.read().await;
                Ok(windowed_votes(events.iter(), &window))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;
    use chrono::TimeZone;
    use std::convert::TryFrom;
    use std::sync::Mutex;

    fn r(value: i64) -> RatingValue {
        RatingValue::try_from(value).unwrap()
    }

    async fn foobar() -> InMemoryProductRepository {
        let repository = InMemoryProductRepository::new();
        repository.create(815, "Foobar".into()).await.unwrap();
        repository
    }

    #[tokio::test]
    async fn rating_updates_tally_and_comments() {
        let repository = foobar().await;
        repository
            .record_rating(815, 3, Some("ok".into()))
            .await
            .unwrap();

        let product = repository.get(815).await.unwrap();
        assert_eq!(
            serde_json::to_value(product.ratings).unwrap(),
            serde_json::json!({"1": 0, "2": 0, "3": 1, "4": 0, "5": 0})
        );
        assert_eq!(product.comments, vec!["ok".to_string()]);
    }

    #[tokio::test]
    async fn out_of_range_rating_changes_nothing() {
        let repository = foobar().await;
        repository.record_rating(815, 3, Some("ok".into())).await.unwrap();
        let before = repository.get(815).await.unwrap();

        for value in [-100, -1, 0, 6, 7, 1000, i64::MAX, i64::MIN] {
            let result = repository.record_rating(815, value, Some("nope".into())).await;
            assert!(matches!(result, Err(RatingError::InvalidRating(_))));
        }

        assert_eq!(repository.get(815).await.unwrap(), before);
    }

    #[tokio::test]
    async fn missing_comment_is_logged_as_empty() {
        let repository = foobar().await;
        let product = repository.record_rating(815, 5, None).await.unwrap();
        assert_eq!(product.comments, vec![String::new()]);
        assert_eq!(product.ratings.count(r(5)), 1);
    }

    #[tokio::test]
    async fn rating_unknown_product_is_not_found() {
        let repository = foobar().await;
        assert!(matches!(
            repository.record_rating(1337, 4, None).await,
            Err(RatingError::NotFound(1337))
        ));
    }

    #[tokio::test]
    async fn unknown_product_wins_over_invalid_rating() {
        let repository = foobar().await;
        assert!(matches!(
            repository.record_rating(1337, 9, None).await,
            Err(RatingError::NotFound(1337))
        ));
        assert!(matches!(
            repository.record_rating(815, 9, None).await,
            Err(RatingError::InvalidRating(_))
        ));
        assert!(repository.exists(815).await.unwrap());
        assert!(!repository.exists(1337).await.unwrap());
    }

    #[tokio::test]
    async fn sub_microsecond_bounds_match_stored_precision() {
        let base = Utc.with_ymd_and_hms(2015, 9, 21, 10, 0, 0).unwrap();
        let repository = InMemoryProductRepository::with_clock(Arc::new(move || {
            base + chrono::Duration::nanoseconds(700)
        }));
        repository.create(815, "Foobar".into()).await.unwrap();
        repository.record_rating(815, 3, None).await.unwrap();

        // the event is stored at `base`, the end bound is read as `base` too
        let window =
            TimeWindow::new(base - chrono::Duration::hours(1), base + chrono::Duration::nanoseconds(300))
                .unwrap();
        let votes = repository.votes(VoteQuery::Window(window)).await.unwrap();
        assert_eq!(votes.get(r(3)), Some(1));
    }

    #[tokio::test]
    async fn duplicate_create_leaves_existing_product_alone() {
        let repository = foobar().await;
        repository.record_rating(815, 2, Some("meh".into())).await.unwrap();
        let before = repository.get(815).await.unwrap();

        assert!(matches!(
            repository.create(815, "Impostor".into()).await,
            Err(RatingError::DuplicateId(815))
        ));
        assert_eq!(repository.get(815).await.unwrap(), before);
        assert_eq!(repository.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let repository = foobar().await;
        repository.delete(815).await.unwrap();

        assert!(matches!(repository.get(815).await, Err(RatingError::NotFound(815))));
        assert!(matches!(repository.delete(815).await, Err(RatingError::NotFound(815))));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order_and_can_be_repeated() {
        let repository = InMemoryProductRepository::new();
        for (id, name) in [(1337, "Soundblaster Pro"), (815, "Foobar"), (42, "Answer")] {
            repository.create(id, name.into()).await.unwrap();
        }
        repository.delete(815).await.unwrap();
        repository.create(7, "Late".into()).await.unwrap();

        let ids: Vec<i32> = repository.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1337, 42, 7]);
        let again: Vec<i32> = repository.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, again);
    }

    #[tokio::test]
    async fn recreated_product_starts_empty() {
        let repository = foobar().await;
        repository.record_rating(815, 4, None).await.unwrap();
        repository.delete(815).await.unwrap();

        let product = repository.create(815, "Foobar II".into()).await.unwrap();
        assert_eq!(product.ratings.total(), 0);
        assert!(product.comments.is_empty());
    }

    #[tokio::test]
    async fn overall_votes_sum_live_products() {
        let repository = InMemoryProductRepository::new();
        repository.create(815, "Foobar".into()).await.unwrap();
        repository.create(1337, "Soundblaster Pro".into()).await.unwrap();
        repository.create(99, "Gone".into()).await.unwrap();
        for (id, rating) in [(815, 3), (815, 3), (1337, 3), (1337, 5), (99, 1)] {
            repository.record_rating(id, rating, None).await.unwrap();
        }
        repository.delete(99).await.unwrap();

        let votes = repository.votes(VoteQuery::Overall).await.unwrap();
        assert_eq!(votes.get(r(1)), Some(0));
        assert_eq!(votes.get(r(3)), Some(3));
        assert_eq!(votes.get(r(5)), Some(1));
        assert_eq!(votes.len(), 5);
    }

    #[tokio::test]
    async fn windowed_votes_use_event_timestamps() {
        let now = Arc::new(Mutex::new(Utc.with_ymd_and_hms(2015, 9, 21, 10, 0, 0).unwrap()));
        let clock_now = now.clone();
        let repository = InMemoryProductRepository::with_clock(Arc::new(move || {
            *clock_now.lock().unwrap()
        }));
        repository.create(815, "Foobar".into()).await.unwrap();

        for (minute, rating) in [(0, 3), (30, 3), (60, 4)] {
            *now.lock().unwrap() =
                Utc.with_ymd_and_hms(2015, 9, 21, 10, 0, 0).unwrap() + chrono::Duration::minutes(minute);
            repository.record_rating(815, rating, None).await.unwrap();
        }

        let at = |h, m| Utc.with_ymd_and_hms(2015, 9, 21, h, m, 0).unwrap();
        let early = TimeWindow::new(at(10, 0), at(10, 45)).unwrap();
        let votes = repository.votes(VoteQuery::Window(early)).await.unwrap();
        assert_eq!(votes, vec![(r(3), 2)].into_iter().collect::<Votes>());

        let whole = TimeWindow::new(at(10, 0), at(11, 0)).unwrap();
        let votes = repository.votes(VoteQuery::Window(whole)).await.unwrap();
        assert_eq!(votes, vec![(r(3), 2), (r(4), 1)].into_iter().collect::<Votes>());

        // history survives the product
        repository.delete(815).await.unwrap();
        let votes = repository.votes(VoteQuery::Window(whole)).await.unwrap();
        assert_eq!(votes.get(r(3)), Some(2));
        let overall = repository.votes(VoteQuery::Overall).await.unwrap();
        assert_eq!(overall, Votes::zeroed());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ratings_are_never_lost() {
        let repository = Arc::new(foobar().await);
        repository.create(1337, "Soundblaster Pro".into()).await.unwrap();

        let mut handles = vec![];
        for worker in 0..8 {
            let repository = repository.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let id = if i % 2 == 0 { 815 } else { 1337 };
                    let rating = (i % 5 + 1) as i64;
                    let product = repository
                        .record_rating(id, rating, Some(format!("{worker}-{i}")))
                        .await
                        .unwrap();
                    assert_eq!(product.ratings.total(), product.comments.len() as u64);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for id in [815, 1337] {
            let product = repository.get(id).await.unwrap();
            assert_eq!(product.ratings.total(), 200);
            assert_eq!(product.comments.len(), 200);
        }
        let overall = repository.votes(VoteQuery::Overall).await.unwrap();
        assert_eq!(overall.iter().map(|(_, c)| c).sum::<u64>(), 400);
    }
}
