//! # booktrack-core
//!
//! Core types, traits, and abstractions for the booktrack library.
//!
//! This crate provides the domain models (books, notes, quotes, reviews,
//! collections, reading lists, tags), the smart-collection filter evaluator,
//! the search request/response types, and the read-only [`RecordStore`]
//! trait that the search aggregator consumes.
//!
//! ## Example
//!
//! ```
//! use booktrack_core::{Book, FilterPredicate, FilterSet, Record};
//!
//! let book = Book::new("The Great Gatsby", Some("F. Scott Fitzgerald")).with_rating(5);
//! let favorites = FilterSet::new().with(FilterPredicate::rating_gte(5));
//!
//! assert!(favorites.matches(&Record::Book(book)));
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod search;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use config::BooktrackConfig;
pub use error::{Error, Result};
pub use filter::*;
pub use models::*;
pub use search::*;
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
