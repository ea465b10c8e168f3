use crate::db::ProductRepository;
use crate::errors::RatingError;
use crate::models::{Product, RatingValue, Tally, Votes};
use crate::services::{overall_votes, VoteQuery};
use chrono::Utc;
use indexmap::IndexMap;
use sqlx::{PgConnection, PgPool};
use std::convert::TryFrom;
use tracing::Instrument;

#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: i32,
    name: String,
}

#[derive(sqlx::FromRow)]
struct TallyRow {
    product_id: i32,
    rating: i32,
    votes: i64,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    product_id: i32,
    comment: String,
}

#[derive(sqlx::FromRow)]
struct VotesRow {
    rating: i32,
    votes: i64,
}

const SERIALIZATION_FAILURE: &str = "40001";

fn storage_error(err: sqlx::Error) -> RatingError {
    tracing::error!("Failed to execute query: {:?}", err);
    RatingError::from(err)
}

fn rating_from_db(rating: i32) -> Result<RatingValue, RatingError> {
    RatingValue::try_from(rating as i64)
        .map_err(|_| RatingError::StorageFailure(format!("unexpected rating {rating} in storage")))
}

/// Repository over the `products`, `ratings` and `productratings` tables.
///
/// Tallies and comment logs are not stored: both are derived from the
/// rating events of a product, so a vote is a single INSERT.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_products(
        conn: &mut PgConnection,
        id: Option<i32>,
    ) -> Result<Vec<Product>, RatingError> {
        let query_span = tracing::info_span!("Fetch products.");
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT product_id, name
            FROM products
            WHERE $1::INTEGER IS NULL OR product_id = $1
            ORDER BY seq
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .instrument(query_span)
        .await
        .map_err(storage_error)?;

        let mut products: IndexMap<i32, Product> = rows
            .into_iter()
            .map(|row| (row.product_id, Product::new(row.product_id, row.name)))
            .collect();
        if products.is_empty() {
            return Ok(vec![]);
        }

        for (product_id, tally) in Self::fetch_tallies(conn, id).await? {
            if let Some(product) = products.get_mut(&product_id) {
                product.ratings = tally;
            }
        }

        let query_span = tracing::info_span!("Fetch product comments.");
        let comments = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT product_id, comment
            FROM productratings
            WHERE product_id IS NOT NULL AND ($1::INTEGER IS NULL OR product_id = $1)
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .instrument(query_span)
        .await
        .map_err(storage_error)?;

        for row in comments {
            if let Some(product) = products.get_mut(&row.product_id) {
                product.comments.push(row.comment);
            }
        }

        Ok(products.into_values().collect())
    }

    async fn fetch_tallies(
        conn: &mut PgConnection,
        id: Option<i32>,
    ) -> Result<IndexMap<i32, Tally>, RatingError> {
        let query_span = tracing::info_span!("Count votes per product.");
        let rows = sqlx::query_as::<_, TallyRow>(
            r#"
            SELECT pr.product_id, r.rating, COUNT(pr.id) AS votes
            FROM productratings pr
            JOIN ratings r ON r.id = pr.rating
            WHERE pr.product_id IS NOT NULL AND ($1::INTEGER IS NULL OR pr.product_id = $1)
            GROUP BY pr.product_id, r.rating
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .instrument(query_span)
        .await
        .map_err(storage_error)?;

        let mut tallies: IndexMap<i32, Tally> = IndexMap::new();
        for row in rows {
            let rating = rating_from_db(row.rating)?;
            tallies
                .entry(row.product_id)
                .or_default()
                .set(rating, row.votes as u64);
        }
        Ok(tallies)
    }

    async fn snapshot(&self, id: Option<i32>) -> Result<Vec<Product>, RatingError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        let products = Self::fetch_products(&mut tx, id).await?;
        tx.commit().await.map_err(storage_error)?;
        Ok(products)
    }
}

#[async_trait::async_trait]
impl ProductRepository for PgProductRepository {
    #[tracing::instrument(name = "Create product in the database.", skip(self))]
    async fn create(&self, id: i32, name: String) -> Result<Product, RatingError> {
        let query_span = tracing::info_span!("Saving new product into the database");
        sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (product_id, name)
            VALUES ($1, $2)
            ON CONFLICT (product_id) DO NOTHING
            RETURNING product_id, name
            "#,
        )
        .bind(id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .instrument(query_span)
        .await
        .map_err(storage_error)?
        .map(|row| {
            tracing::info!("New product {} have been saved to database", row.product_id);
            Product::new(row.product_id, row.name)
        })
        .ok_or(RatingError::DuplicateId(id))
    }

    async fn get(&self, id: i32) -> Result<Product, RatingError> {
        self.snapshot(Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or(RatingError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Product>, RatingError> {
        self.snapshot(None).await
    }

    async fn exists(&self, id: i32) -> Result<bool, RatingError> {
        let query_span = tracing::info_span!("Check product exists.");
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM products WHERE product_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .instrument(query_span)
        .await
        .map_err(storage_error)
    }

    #[tracing::instrument(name = "Delete product from the database.", skip(self))]
    async fn delete(&self, id: i32) -> Result<(), RatingError> {
        let query_span = tracing::info_span!("Deleting product");
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span)
            .await
            .map_err(storage_error)?;

        match result.rows_affected() {
            0 => Err(RatingError::NotFound(id)),
            _ => Ok(()),
        }
    }

    #[tracing::instrument(name = "Record rating in the database.", skip(self, comment))]
    async fn record(
        &self,
        id: i32,
        rating: RatingValue,
        comment: String,
    ) -> Result<Product, RatingError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        // the product read back below must not mix in votes committed meanwhile
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        // the share lock keeps the product alive until the vote is committed
        let query_span = tracing::info_span!("Lock product for rating.");
        sqlx::query("SELECT product_id FROM products WHERE product_id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .instrument(query_span)
            .await
            .map_err(|err| {
                let deleted_meanwhile = matches!(
                    &err,
                    sqlx::Error::Database(db) if db.code().as_deref() == Some(SERIALIZATION_FAILURE)
                );
                if deleted_meanwhile {
                    RatingError::NotFound(id)
                } else {
                    storage_error(err)
                }
            })?
            .ok_or(RatingError::NotFound(id))?;

        let query_span = tracing::info_span!("Saving new rating into the database");
        sqlx::query(
            r#"
            INSERT INTO productratings (product_id, rating, comment, time_frame)
            SELECT $1, r.id, $3, $4
            FROM ratings r
            WHERE r.rating = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(i32::from(rating))
        .bind(&comment)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .instrument(query_span)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| RatingError::StorageFailure(format!("rating {rating} is not registered")))?;

        let product = Self::fetch_products(&mut tx, Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or(RatingError::NotFound(id))?;
        tx.commit().await.map_err(storage_error)?;

        tracing::info!("Rating {} for product {} saved", rating, id);
        Ok(product)
    }

    async fn votes(&self, query: VoteQuery) -> Result<Votes, RatingError> {
        match query {
            VoteQuery::Overall => {
                let mut conn = self.pool.acquire().await.map_err(storage_error)?;
                let tallies = Self::fetch_tallies(&mut conn, None).await?;
                Ok(overall_votes(tallies.values()))
            }
            VoteQuery::Window(window) => {
                let query_span = tracing::info_span!("Count votes in a time frame.");
                let rows = sqlx::query_as::<_, VotesRow>(
                    r#"
                    SELECT r.rating, COUNT(pr.id) AS votes
                    FROM productratings pr
                    JOIN ratings r ON r.id = pr.rating
                    WHERE pr.time_frame >= $1 AND pr.time_frame <= $2
                    GROUP BY r.rating
                    "#,
                )
                .bind(window.start)
                .bind(window.end)
                .fetch_all(&self.pool)
                .instrument(query_span)
                .await
                .map_err(storage_error)?;

                rows.into_iter()
                    .map(|row| rating_from_db(row.rating).map(|rating| (rating, row.votes as u64)))
                    .collect::<Result<Votes, RatingError>>()
            }
        }
    }
}
