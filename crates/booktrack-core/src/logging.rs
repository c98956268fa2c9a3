//! Structured log field names shared by every booktrack crate.
//!
//! `tracing` macros take field names as literals, so these constants mostly
//! document the schema. Spans that fill a field after the fact
//! (`Span::record`) use them directly.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Bad configuration value or unknown scope, fallback applied |
//! | INFO  | Library opened, schema ready, search completed |
//! | DEBUG | Per-scope hit counts, collection evaluation |
//! | TRACE | Individual predicate outcomes |

/// Originating subsystem: "search", "database", "filter" or "cli".
pub const SUBSYSTEM: &str = "subsystem";

/// Component within the subsystem, e.g. "manager", "pool", "collections".
pub const COMPONENT: &str = "component";

/// Operation name, e.g. "search", "advanced_search", "get_books".
pub const OPERATION: &str = "op";

/// Raw query text of a search.
pub const QUERY: &str = "query";

/// Entity scope being searched.
pub const SCOPE: &str = "scope";

pub const COLLECTION_ID: &str = "collection_id";

/// Table touched by a schema or repository operation.
pub const DB_TABLE: &str = "db_table";

/// Hits returned after pagination.
pub const RESULT_COUNT: &str = "result_count";

/// Hits before pagination.
pub const TOTAL_COUNT: &str = "total_count";

/// Targets plus term lists in an advanced search.
pub const FILTER_COUNT: &str = "filter_count";

pub const POOL_SIZE: &str = "pool_size";

/// Wall-clock milliseconds.
pub const DURATION_MS: &str = "duration_ms";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_snake_case() {
        for name in [
            SUBSYSTEM,
            COMPONENT,
            OPERATION,
            QUERY,
            SCOPE,
            COLLECTION_ID,
            DB_TABLE,
            RESULT_COUNT,
            TOTAL_COUNT,
            FILTER_COUNT,
            POOL_SIZE,
            DURATION_MS,
        ] {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
