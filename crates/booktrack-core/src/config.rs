//! Runtime configuration loaded from environment variables.

use crate::defaults;

/// Runtime configuration for booktrack.
///
/// Read from environment variables with fallback to the constants in
/// [`crate::defaults`]. Invalid values are logged and ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct BooktrackConfig {
    /// SQLite connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Default page size for unified search.
    pub search_limit: usize,
    /// Snippet length used when the query is not found in a field.
    pub snippet_length: usize,
}

impl Default for BooktrackConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            max_connections: defaults::MAX_CONNECTIONS,
            search_limit: defaults::PAGE_LIMIT_SEARCH,
            snippet_length: defaults::SNIPPET_LENGTH,
        }
    }
}

impl BooktrackConfig {
    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `BOOKTRACK_DATABASE_URL` (default: `sqlite://booktrack.db?mode=rwc`)
    /// - `BOOKTRACK_MAX_CONNECTIONS` (default: 5, clamped to 1..=64)
    /// - `BOOKTRACK_SEARCH_LIMIT` (default: 50, clamped to 1..=200)
    /// - `BOOKTRACK_SNIPPET_LENGTH` (default: 150, minimum 10)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("BOOKTRACK_DATABASE_URL") {
            if val.trim().is_empty() {
                tracing::warn!(value = %val, "Empty BOOKTRACK_DATABASE_URL, using default");
            } else {
                config.database_url = val;
            }
        }

        if let Ok(val) = std::env::var("BOOKTRACK_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse::<u32>() {
                config.max_connections = n.clamp(1, 64);
            } else {
                tracing::warn!(value = %val, "Invalid BOOKTRACK_MAX_CONNECTIONS, using default");
            }
        }

        if let Ok(val) = std::env::var("BOOKTRACK_SEARCH_LIMIT") {
            if let Ok(n) = val.parse::<usize>() {
                config.search_limit = n.clamp(1, defaults::PAGE_LIMIT_SEARCH_MAX);
            } else {
                tracing::warn!(value = %val, "Invalid BOOKTRACK_SEARCH_LIMIT, using default");
            }
        }

        if let Ok(val) = std::env::var("BOOKTRACK_SNIPPET_LENGTH") {
            if let Ok(n) = val.parse::<usize>() {
                config.snippet_length = n.max(10);
            } else {
                tracing::warn!(value = %val, "Invalid BOOKTRACK_SNIPPET_LENGTH, using default");
            }
        }

        config
    }

    /// Whether the configured database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}
