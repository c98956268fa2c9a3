//! Book repository implementation.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use booktrack_core::{AuthorSummary, Book, BookRepository, Error, Result, StoreConditions};

const BOOK_COLUMNS: &str = "id, title, author, status, rating, date_added, date_started, \
     date_finished, isbn, page_count, description, publisher, tags, genres, series, \
     series_index, publication_year, created_at";

/// SQLite implementation of BookRepository.
#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    /// Create a new SqliteBookRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) fn book_from_row(r: &SqliteRow) -> Result<Book> {
    let status: String = r.get("status");
    Ok(Book {
        id: r.get("id"),
        title: r.get("title"),
        author: r.get("author"),
        status: status.parse()?,
        rating: r.get("rating"),
        date_added: r.get("date_added"),
        date_started: r.get("date_started"),
        date_finished: r.get("date_finished"),
        isbn: r.get("isbn"),
        page_count: r.get("page_count"),
        description: r.get("description"),
        publisher: r.get("publisher"),
        tags: r.get::<Json<Vec<String>>, _>("tags").0,
        genres: r.get::<Json<Vec<String>>, _>("genres").0,
        series: r.get("series"),
        series_index: r.get("series_index"),
        publication_year: r.get("publication_year"),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn insert(&self, book: &Book) -> Result<Uuid> {
        sqlx::query(
            "INSERT INTO books (id, title, author, status, rating, date_added, date_started,
                date_finished, isbn, page_count, description, publisher, tags, genres, series,
                series_index, publication_year, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.status.as_str())
        .bind(book.rating)
        .bind(book.date_added)
        .bind(book.date_started)
        .bind(book.date_finished)
        .bind(&book.isbn)
        .bind(book.page_count)
        .bind(&book.description)
        .bind(&book.publisher)
        .bind(Json(&book.tags))
        .bind(Json(&book.genres))
        .bind(&book.series)
        .bind(book.series_index)
        .bind(book.publication_year)
        .bind(book.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(book.id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(book_from_row).transpose()
    }

    async fn update(&self, book: &Book) -> Result<()> {
        let result = sqlx::query(
            "UPDATE books SET title = ?, author = ?, status = ?, rating = ?, date_started = ?,
                date_finished = ?, description = ?, tags = ?, genres = ?, series = ?,
                series_index = ?, publication_year = ?
             WHERE id = ?",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.status.as_str())
        .bind(book.rating)
        .bind(book.date_started)
        .bind(book.date_finished)
        .bind(&book.description)
        .bind(Json(&book.tags))
        .bind(Json(&book.genres))
        .bind(&book.series)
        .bind(book.series_index)
        .bind(book.publication_year)
        .bind(book.id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::BookNotFound(book.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn list(&self, conditions: &StoreConditions) -> Result<Vec<Book>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE 1 = 1"));
        if let Some(status) = conditions.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(min) = conditions.min_rating {
            qb.push(" AND rating >= ").push_bind(min);
        }
        qb.push(" ORDER BY title COLLATE NOCASE");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        // Substring and date-range conditions are applied after decoding.
        let mut books = Vec::with_capacity(rows.len());
        for row in &rows {
            let book = book_from_row(row)?;
            if conditions.admits_book(&book) {
                books.push(book);
            }
        }
        Ok(books)
    }

    async fn authors(&self) -> Result<Vec<AuthorSummary>> {
        let rows = sqlx::query(
            "SELECT author, COUNT(*) AS book_count
             FROM books
             WHERE author IS NOT NULL AND author != ''
             GROUP BY author
             ORDER BY author COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| AuthorSummary {
                name: r.get("author"),
                book_count: r.get("book_count"),
            })
            .collect())
    }
}
