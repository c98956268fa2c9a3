//! # booktrack-db
//!
//! SQLite database layer for booktrack.
//!
//! This crate provides:
//! - Connection pool management
//! - Schema bootstrap
//! - Repository implementations for books, notes, quotes, reviews,
//!   collections (manual and smart), reading lists, and tags
//! - A [`RecordStore`] implementation the search aggregator reads from
//!
//! ## Example
//!
//! ```rust,ignore
//! use booktrack_db::{Book, BookRepository, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://booktrack.db?mode=rwc").await?;
//!
//!     let id = db.books.insert(&Book::new("Dune", Some("Frank Herbert"))).await?;
//!     println!("Created book: {}", id);
//!     Ok(())
//! }
//! ```

pub mod books;
pub mod collections;
pub mod lists;
pub mod notes;
pub mod pool;
pub mod reviews;
pub mod schema;
mod store;
pub mod tags;

// Re-export core types
pub use booktrack_core::*;

pub use books::SqliteBookRepository;
pub use collections::{default_collection_requests, SqliteCollectionRepository};
pub use lists::SqliteListRepository;
pub use notes::{SqliteNoteRepository, SqliteQuoteRepository};
pub use pool::{create_pool_with_config, PoolConfig, IN_MEMORY_URL};
pub use reviews::SqliteReviewRepository;
pub use schema::ensure_schema;
pub use tags::SqliteTagRepository;

/// Database handle that provides access to all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    /// Book repository for CRUD operations.
    pub books: SqliteBookRepository,
    /// Reading note repository.
    pub notes: SqliteNoteRepository,
    /// Quotation repository.
    pub quotes: SqliteQuoteRepository,
    /// Review repository.
    pub reviews: SqliteReviewRepository,
    /// Manual and smart collection repository.
    pub collections: SqliteCollectionRepository,
    /// Reading list repository.
    pub lists: SqliteListRepository,
    /// Tag repository.
    pub tags: SqliteTagRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            books: SqliteBookRepository::new(pool.clone()),
            notes: SqliteNoteRepository::new(pool.clone()),
            quotes: SqliteQuoteRepository::new(pool.clone()),
            reviews: SqliteReviewRepository::new(pool.clone()),
            collections: SqliteCollectionRepository::new(pool.clone()),
            lists: SqliteListRepository::new(pool.clone()),
            tags: SqliteTagRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to a database URL and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_config(database_url, PoolConfig::default()).await
    }

    /// Connect with a custom pool configuration and make sure the schema exists.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Connect using a loaded [`BooktrackConfig`].
    pub async fn from_config(config: &BooktrackConfig) -> Result<Self> {
        let pool_config = if config.is_in_memory() {
            PoolConfig::in_memory()
        } else {
            PoolConfig::default().max_connections(config.max_connections)
        };
        Self::connect_with_config(&config.database_url, pool_config).await
    }

    /// Fresh private in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        Self::connect_with_config(IN_MEMORY_URL, PoolConfig::in_memory()).await
    }
}
