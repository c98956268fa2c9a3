//! Tag repository implementation.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use booktrack_core::{new_v7, Error, Result, StoreConditions, Tag};

/// SQLite repository for user-defined tags.
#[derive(Clone)]
pub struct SqliteTagRepository {
    pool: SqlitePool,
}

impl SqliteTagRepository {
    /// Create a new SqliteTagRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a tag, or return the id of the existing tag with that name.
    pub async fn create(
        &self,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Uuid> {
        sqlx::query(
            "INSERT INTO tags (id, name, color, description, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(new_v7())
        .bind(name)
        .bind(color)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    /// Attach a tag to a book.
    pub async fn tag_book(&self, book_id: Uuid, tag_id: Uuid) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO book_tags (book_id, tag_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// List tags with book counts, ordered by name.
    pub async fn list(&self, conditions: &StoreConditions) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.color, t.description, t.created_at,
                    (SELECT COUNT(*) FROM book_tags bt WHERE bt.tag_id = t.id) AS book_count
             FROM tags t
             ORDER BY t.name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Tag {
                id: r.get("id"),
                name: r.get("name"),
                color: r.get("color"),
                description: r.get("description"),
                book_count: r.get("book_count"),
                created_at: r.get("created_at"),
            })
            .filter(|t| conditions.admits_tag(t))
            .collect())
    }
}
