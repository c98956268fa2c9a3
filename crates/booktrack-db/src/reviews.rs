//! Review repository implementation.

use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use booktrack_core::{Error, Result, Review, StoreConditions};

/// SQLite repository for book reviews.
#[derive(Clone)]
pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    /// Create a new SqliteReviewRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a review, returning its id.
    pub async fn insert(&self, review: &Review) -> Result<Uuid> {
        sqlx::query(
            "INSERT INTO reviews (id, book_id, rating, title, content, contains_spoilers,
                is_favorite, tags, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(review.id)
        .bind(review.book_id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.content)
        .bind(review.contains_spoilers)
        .bind(review.is_favorite)
        .bind(Json(&review.tags))
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(review.id)
    }

    /// List reviews satisfying the conditions, newest first.
    pub async fn list(&self, conditions: &StoreConditions) -> Result<Vec<Review>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT r.id, r.book_id, b.title AS book_title, r.rating, r.title, r.content,
                    r.contains_spoilers, r.is_favorite, r.tags, r.created_at
             FROM reviews r
             LEFT JOIN books b ON b.id = r.book_id
             WHERE 1 = 1",
        );
        if let Some(book_id) = conditions.book_id {
            qb.push(" AND r.book_id = ").push_bind(book_id);
        }
        if let Some(min) = conditions.min_rating {
            qb.push(" AND r.rating >= ").push_bind(min);
        }
        qb.push(" ORDER BY r.created_at DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Review {
                id: r.get("id"),
                book_id: r.get("book_id"),
                book_title: r.get("book_title"),
                rating: r.get("rating"),
                title: r.get("title"),
                content: r.get("content"),
                contains_spoilers: r.get("contains_spoilers"),
                is_favorite: r.get("is_favorite"),
                tags: r.get::<Json<Vec<String>>, _>("tags").0,
                created_at: r.get("created_at"),
            })
            .filter(|r| conditions.admits_review(r))
            .collect())
    }
}
