//! SQLite connection pool setup.
//!
//! File-backed libraries run in WAL mode so readers never block on the single
//! writer. In-memory libraries live inside one connection, which the pool must
//! therefore never close or recycle.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use booktrack_core::{defaults, Error, Result};

/// URL of a private in-memory database.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool settings for one library file.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Time allowed to acquire a connection from the pool.
    pub acquire_timeout: Duration,
    /// `None` keeps idle connections open forever.
    pub idle_timeout: Option<Duration>,
    /// Create the database file when it does not exist yet.
    pub create_if_missing: bool,
    /// Use the write-ahead log. Ignored for in-memory databases.
    pub wal: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            create_if_missing: true,
            wal: true,
        }
    }
}

impl PoolConfig {
    /// Single pinned connection for `sqlite::memory:`, where every new
    /// connection would open a different empty database.
    pub fn in_memory() -> Self {
        Self {
            max_connections: 1,
            idle_timeout: None,
            wal: false,
            ..Self::default()
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Open existing files only.
    pub fn existing_only(mut self) -> Self {
        self.create_if_missing = false;
        self
    }
}

/// Open a pool. Foreign keys are enforced on every connection.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<SqlitePool> {
    let start = Instant::now();

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(Error::Database)?
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        .create_if_missing(config.create_if_missing);
    if config.wal {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "open",
        max_connections = config.max_connections,
        wal = config.wal,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Library opened"
    );
    Ok(pool)
}
