//! Reading list repository implementation.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use booktrack_core::{new_v7, Error, ReadingList, Result, StoreConditions};

/// SQLite repository for reading lists.
#[derive(Clone)]
pub struct SqliteListRepository {
    pool: SqlitePool,
}

impl SqliteListRepository {
    /// Create a new SqliteListRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a reading list, returning its id.
    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Uuid> {
        let id = new_v7();
        sqlx::query(
            "INSERT INTO reading_lists (id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    /// Append a book at the end of a list.
    pub async fn add_book(&self, list_id: Uuid, book_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO reading_list_books (list_id, book_id, position, added_at)
             VALUES (?, ?,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM reading_list_books WHERE list_id = ?),
                ?)",
        )
        .bind(list_id)
        .bind(book_id)
        .bind(list_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// List reading lists with book counts, ordered by name.
    pub async fn list(&self, conditions: &StoreConditions) -> Result<Vec<ReadingList>> {
        let rows = sqlx::query(
            "SELECT l.id, l.name, l.description, l.created_at,
                    (SELECT COUNT(*) FROM reading_list_books rb WHERE rb.list_id = l.id) AS book_count
             FROM reading_lists l
             ORDER BY l.name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ReadingList {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
                book_count: r.get("book_count"),
                created_at: r.get("created_at"),
            })
            .filter(|l| conditions.admits_list(l))
            .collect())
    }
}
