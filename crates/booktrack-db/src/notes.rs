//! Note and quote repositories.

use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use booktrack_core::{Error, Note, Quote, Result, StoreConditions};

/// SQLite repository for reading notes.
#[derive(Clone)]
pub struct SqliteNoteRepository {
    pool: SqlitePool,
}

fn note_from_row(r: &SqliteRow) -> Note {
    Note {
        id: r.get("id"),
        book_id: r.get("book_id"),
        book_title: r.get("book_title"),
        note_type: r.get("note_type"),
        title: r.get("title"),
        content: r.get("content"),
        chapter: r.get("chapter"),
        page_number: r.get("page_number"),
        tags: r.get::<Json<Vec<String>>, _>("tags").0,
        is_favorite: r.get("is_favorite"),
        created_at: r.get("created_at"),
    }
}

impl SqliteNoteRepository {
    /// Create a new SqliteNoteRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a note, returning its id.
    pub async fn insert(&self, note: &Note) -> Result<Uuid> {
        sqlx::query(
            "INSERT INTO notes (id, book_id, note_type, title, content, chapter, page_number,
                tags, is_favorite, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(note.id)
        .bind(note.book_id)
        .bind(&note.note_type)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.chapter)
        .bind(note.page_number)
        .bind(Json(&note.tags))
        .bind(note.is_favorite)
        .bind(note.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(note.id)
    }

    /// List notes satisfying the conditions, newest first.
    pub async fn list(&self, conditions: &StoreConditions) -> Result<Vec<Note>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT n.id, n.book_id, b.title AS book_title, n.note_type, n.title, n.content,
                    n.chapter, n.page_number, n.tags, n.is_favorite, n.created_at
             FROM notes n
             LEFT JOIN books b ON b.id = n.book_id
             WHERE 1 = 1",
        );
        if let Some(book_id) = conditions.book_id {
            qb.push(" AND n.book_id = ").push_bind(book_id);
        }
        if let Some(note_type) = &conditions.note_type {
            qb.push(" AND n.note_type = ").push_bind(note_type.clone());
        }
        if conditions.favorites_only {
            qb.push(" AND n.is_favorite = 1");
        }
        qb.push(" ORDER BY n.created_at DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(note_from_row)
            .filter(|n| conditions.admits_note(n))
            .collect())
    }
}

/// SQLite repository for quotations.
#[derive(Clone)]
pub struct SqliteQuoteRepository {
    pool: SqlitePool,
}

fn quote_from_row(r: &SqliteRow) -> Quote {
    Quote {
        id: r.get("id"),
        book_id: r.get("book_id"),
        book_title: r.get("book_title"),
        text: r.get("text"),
        quote_type: r.get("quote_type"),
        speaker: r.get("speaker"),
        context: r.get("context"),
        chapter: r.get("chapter"),
        page_number: r.get("page_number"),
        tags: r.get::<Json<Vec<String>>, _>("tags").0,
        is_favorite: r.get("is_favorite"),
        created_at: r.get("created_at"),
    }
}

impl SqliteQuoteRepository {
    /// Create a new SqliteQuoteRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a quote, returning its id.
    pub async fn insert(&self, quote: &Quote) -> Result<Uuid> {
        sqlx::query(
            "INSERT INTO quotes (id, book_id, text, quote_type, speaker, context, chapter,
                page_number, tags, is_favorite, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(quote.id)
        .bind(quote.book_id)
        .bind(&quote.text)
        .bind(&quote.quote_type)
        .bind(&quote.speaker)
        .bind(&quote.context)
        .bind(&quote.chapter)
        .bind(quote.page_number)
        .bind(Json(&quote.tags))
        .bind(quote.is_favorite)
        .bind(quote.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(quote.id)
    }

    /// List quotes satisfying the conditions, newest first.
    pub async fn list(&self, conditions: &StoreConditions) -> Result<Vec<Quote>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT q.id, q.book_id, b.title AS book_title, q.text, q.quote_type, q.speaker,
                    q.context, q.chapter, q.page_number, q.tags, q.is_favorite, q.created_at
             FROM quotes q
             LEFT JOIN books b ON b.id = q.book_id
             WHERE 1 = 1",
        );
        if let Some(book_id) = conditions.book_id {
            qb.push(" AND q.book_id = ").push_bind(book_id);
        }
        if conditions.favorites_only {
            qb.push(" AND q.is_favorite = 1");
        }
        qb.push(" ORDER BY q.created_at DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(quote_from_row)
            .filter(|q| conditions.admits_quote(q))
            .collect())
    }
}
