//! Centralized default constants for booktrack.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// DATABASE
// =============================================================================

/// Default SQLite database URL (created on first connect).
pub const DATABASE_URL: &str = "sqlite://booktrack.db?mode=rwc";

/// Default maximum number of pooled connections.
pub const MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for unified search.
pub const PAGE_LIMIT_SEARCH: usize = 50;

/// Largest page a unified search request may ask for.
pub const PAGE_LIMIT_SEARCH_MAX: usize = 200;

/// Default limit for entity-specific searches (books, notes, quotes, reviews).
pub const PAGE_LIMIT_ENTITY: usize = 20;

/// Default limit for autocomplete suggestions.
pub const PAGE_LIMIT_AUTOCOMPLETE: usize = 10;

/// Default page offset.
pub const PAGE_OFFSET: usize = 0;

// =============================================================================
// QUERY VALIDATION
// =============================================================================

/// Maximum accepted query length in characters.
pub const MAX_QUERY_LENGTH: usize = 500;

/// Lowest rating accepted by a `min_rating` filter.
pub const RATING_MIN: f64 = 0.0;

/// Highest rating accepted by a `min_rating` filter.
pub const RATING_MAX: f64 = 5.0;

// =============================================================================
// SNIPPET
// =============================================================================

/// Snippet length in characters when the query is not found in the text.
pub const SNIPPET_LENGTH: usize = 150;

/// Characters of context kept before the first match.
pub const SNIPPET_LEAD: usize = 50;

/// Characters of context kept after the end of the first match.
pub const SNIPPET_TAIL: usize = 100;

/// Characters of quote text used as a quote hit's title.
pub const QUOTE_TITLE_LENGTH: usize = 50;

/// Marker appended or prepended to truncated text.
pub const ELLIPSIS: &str = "...";

// =============================================================================
// RELEVANCE
// =============================================================================

/// Award for a field exactly equal to a query term.
pub const RELEVANCE_EXACT: f64 = 1.0;

/// Award for a field starting with a query term.
pub const RELEVANCE_PREFIX: f64 = 0.8;

/// Award for a field merely containing a query term.
pub const RELEVANCE_CONTAINS: f64 = 0.5;

/// Base score for a record admitted by advanced search.
pub const ADVANCED_BASE_SCORE: f64 = 0.5;

/// Bonus per `should_include` term found by advanced search.
pub const ADVANCED_SHOULD_BONUS: f64 = 0.1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_limits_ordered() {
        const {
            assert!(PAGE_LIMIT_AUTOCOMPLETE < PAGE_LIMIT_ENTITY);
            assert!(PAGE_LIMIT_ENTITY < PAGE_LIMIT_SEARCH);
            assert!(PAGE_LIMIT_SEARCH <= PAGE_LIMIT_SEARCH_MAX);
        }
    }

    #[test]
    fn snippet_window_fits_length() {
        const {
            assert!(SNIPPET_LEAD + SNIPPET_TAIL == SNIPPET_LENGTH);
            assert!(QUOTE_TITLE_LENGTH < SNIPPET_LENGTH);
        }
    }

    #[test]
    fn relevance_awards_ordered() {
        let awards = [RELEVANCE_CONTAINS, RELEVANCE_PREFIX, RELEVANCE_EXACT];
        for w in awards.windows(2) {
            assert!(w[0] < w[1], "Expected {} < {}", w[0], w[1]);
        }
        assert!(ADVANCED_BASE_SCORE + ADVANCED_SHOULD_BONUS <= 1.0);
    }
}
