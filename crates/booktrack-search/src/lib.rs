//! # booktrack-search
//!
//! Unified search and autocomplete for booktrack.
//!
//! This crate provides:
//! - Free-text search across books, notes, quotes, reviews, collections,
//!   reading lists, tags and authors
//! - Field-targeted search with must/should/exclude term lists
//! - Entity-specific searches and title/author autocomplete
//! - Heuristic relevance scoring and snippet extraction
//! - An in-memory [`RecordStore`] for tests and embedding
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use booktrack_search::{Database, SearchManager, SearchQuery, SearchScope};
//!
//! let db = Database::connect("sqlite://booktrack.db?mode=rwc").await?;
//! let manager = SearchManager::new(Arc::new(db));
//!
//! let results = manager
//!     .search(&SearchQuery::new("gatsby").with_scopes(&[SearchScope::Books]))
//!     .await?;
//! for hit in results.results {
//!     println!("{} ({:.2})", hit.title, hit.relevance_score);
//! }
//! ```

pub mod manager;
pub mod memory;
pub mod ranking;
pub mod relevance;
pub mod scopes;

// Re-export core types
pub use booktrack_core::*;
pub use booktrack_db::Database;

// Re-export search types
pub use manager::SearchManager;
pub use memory::InMemoryStore;
pub use ranking::{paginate, sort_hits, FacetCounter, Page};
pub use relevance::{calculate_relevance, create_snippet};
