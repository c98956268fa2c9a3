//! Schema bootstrap.
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS`, so running
//! [`ensure_schema`] against an existing database is a no-op.
//!
//! Ids are UUIDv7 stored as 16-byte blobs. Token lists (`tags`, `genres`)
//! are JSON arrays in TEXT columns. Timestamps and dates are TEXT.

use sqlx::SqlitePool;
use tracing::info;

use booktrack_core::{Error, Result};

const STATEMENTS: &[(&str, &str)] = &[
    (
        "books",
        "CREATE TABLE IF NOT EXISTS books (
            id BLOB PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            author TEXT,
            status TEXT NOT NULL DEFAULT 'wishlist',
            rating INTEGER CHECK (rating BETWEEN 0 AND 5),
            date_added TEXT,
            date_started TEXT,
            date_finished TEXT,
            isbn TEXT,
            page_count INTEGER,
            description TEXT,
            publisher TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            genres TEXT NOT NULL DEFAULT '[]',
            series TEXT,
            series_index REAL,
            publication_year INTEGER,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "notes",
        "CREATE TABLE IF NOT EXISTS notes (
            id BLOB PRIMARY KEY NOT NULL,
            book_id BLOB NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            note_type TEXT NOT NULL DEFAULT 'note',
            title TEXT,
            content TEXT NOT NULL,
            chapter TEXT,
            page_number INTEGER,
            tags TEXT NOT NULL DEFAULT '[]',
            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "quotes",
        "CREATE TABLE IF NOT EXISTS quotes (
            id BLOB PRIMARY KEY NOT NULL,
            book_id BLOB NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            quote_type TEXT NOT NULL DEFAULT 'quote',
            speaker TEXT,
            context TEXT,
            chapter TEXT,
            page_number INTEGER,
            tags TEXT NOT NULL DEFAULT '[]',
            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "reviews",
        "CREATE TABLE IF NOT EXISTS reviews (
            id BLOB PRIMARY KEY NOT NULL,
            book_id BLOB NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            rating REAL CHECK (rating BETWEEN 0 AND 5),
            title TEXT,
            content TEXT,
            contains_spoilers INTEGER NOT NULL DEFAULT 0,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )",
    ),
    (
        "collections",
        "CREATE TABLE IF NOT EXISTS collections (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            collection_type TEXT NOT NULL DEFAULT 'manual',
            smart_criteria TEXT,
            icon TEXT,
            color TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_default INTEGER NOT NULL DEFAULT 0,
            is_pinned INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "collection_books",
        "CREATE TABLE IF NOT EXISTS collection_books (
            collection_id BLOB NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
            book_id BLOB NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            added_at TEXT NOT NULL,
            notes TEXT,
            PRIMARY KEY (collection_id, book_id)
        )",
    ),
    (
        "reading_lists",
        "CREATE TABLE IF NOT EXISTS reading_lists (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "reading_list_books",
        "CREATE TABLE IF NOT EXISTS reading_list_books (
            list_id BLOB NOT NULL REFERENCES reading_lists(id) ON DELETE CASCADE,
            book_id BLOB NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            added_at TEXT NOT NULL,
            PRIMARY KEY (list_id, book_id)
        )",
    ),
    (
        "tags",
        "CREATE TABLE IF NOT EXISTS tags (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE,
            color TEXT,
            description TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "book_tags",
        "CREATE TABLE IF NOT EXISTS book_tags (
            book_id BLOB NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            tag_id BLOB NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, tag_id)
        )",
    ),
];

/// Create every table that does not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for (table, statement) in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(Error::Database)?;
        tracing::trace!(
            subsystem = "database",
            component = "schema",
            db_table = table,
            "Table ensured"
        );
    }

    info!(
        subsystem = "database",
        component = "schema",
        op = "ensure",
        table_count = STATEMENTS.len(),
        "Schema ready"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool_with_config, PoolConfig, IN_MEMORY_URL};

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = create_pool_with_config(IN_MEMORY_URL, PoolConfig::in_memory())
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        for (table, _) in STATEMENTS {
            assert!(tables.iter().any(|t| t.as_str() == *table), "missing table {table}");
        }
    }
}
