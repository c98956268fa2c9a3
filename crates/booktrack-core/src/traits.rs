//! Core traits for booktrack.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::filter::FilterSet;
use crate::models::{
    AuthorSummary, Book, BookStatus, Collection, CollectionBook, CollectionBookUpdate,
    CollectionType, CreateCollectionRequest, Note, Quote, ReadingList, Review, Tag,
    UpdateCollectionRequest,
};
use crate::search::SearchFilters;
use crate::Result;

// =============================================================================
// RECORD STORE
// =============================================================================

/// Simple equality/range conditions pushed down to a [`RecordStore`].
///
/// Each fetch only honors the conditions that apply to its entity kind;
/// the rest are ignored. Text conditions are case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreConditions {
    pub status: Option<BookStatus>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub min_rating: Option<f64>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub favorites_only: bool,
    pub book_id: Option<Uuid>,
    pub note_type: Option<String>,
    pub speaker: Option<String>,
}

impl StoreConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: BookStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_book(mut self, book_id: Uuid) -> Self {
        self.book_id = Some(book_id);
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn favorites_only(mut self) -> Self {
        self.favorites_only = true;
        self
    }

    fn admits_created(&self, created_at: DateTime<Utc>) -> bool {
        self.created_from.map_or(true, |from| created_at >= from)
            && self.created_to.map_or(true, |to| created_at <= to)
    }

    fn admits_book_id(&self, book_id: Uuid) -> bool {
        self.book_id.map_or(true, |id| id == book_id)
    }

    pub fn admits_book(&self, book: &Book) -> bool {
        self.status.map_or(true, |s| s == book.status)
            && self.author.as_deref().map_or(true, |needle| {
                contains_ci(book.author.as_deref().unwrap_or_default(), needle)
            })
            && self
                .genre
                .as_deref()
                .map_or(true, |needle| book.genres.iter().any(|g| contains_ci(g, needle)))
            && self.min_rating.map_or(true, |min| {
                book.rating.is_some_and(|rating| rating as f64 >= min)
            })
            && self.admits_created(book.created_at)
    }

    pub fn admits_note(&self, note: &Note) -> bool {
        (!self.favorites_only || note.is_favorite)
            && self.admits_book_id(note.book_id)
            && self
                .note_type
                .as_deref()
                .map_or(true, |t| t == note.note_type)
            && self.admits_created(note.created_at)
    }

    pub fn admits_quote(&self, quote: &Quote) -> bool {
        (!self.favorites_only || quote.is_favorite)
            && self.admits_book_id(quote.book_id)
            && self.speaker.as_deref().map_or(true, |needle| {
                contains_ci(quote.speaker.as_deref().unwrap_or_default(), needle)
            })
            && self.admits_created(quote.created_at)
    }

    pub fn admits_review(&self, review: &Review) -> bool {
        self.admits_book_id(review.book_id)
            && self
                .min_rating
                .map_or(true, |min| review.rating.is_some_and(|rating| rating >= min))
            && self.admits_created(review.created_at)
    }

    pub fn admits_collection(&self, collection: &Collection) -> bool {
        self.admits_created(collection.created_at)
    }

    pub fn admits_list(&self, list: &ReadingList) -> bool {
        self.admits_created(list.created_at)
    }

    pub fn admits_tag(&self, tag: &Tag) -> bool {
        self.admits_created(tag.created_at)
    }
}

impl From<&SearchFilters> for StoreConditions {
    fn from(filters: &SearchFilters) -> Self {
        Self {
            status: filters.book_status,
            author: filters.author.clone(),
            genre: filters.genre.clone(),
            min_rating: filters.min_rating,
            created_from: filters.date_from,
            created_to: filters.date_to,
            favorites_only: filters.favorites_only,
            ..Self::default()
        }
    }
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Read-only access to every searchable entity kind.
///
/// The search aggregator only depends on this trait, so it can run against
/// SQLite or an in-memory fake.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Books satisfying the conditions.
    async fn fetch_books(&self, conditions: &StoreConditions) -> Result<Vec<Book>>;

    /// Notes satisfying the conditions, with `book_title` filled in.
    async fn fetch_notes(&self, conditions: &StoreConditions) -> Result<Vec<Note>>;

    /// Quotes satisfying the conditions, with `book_title` filled in.
    async fn fetch_quotes(&self, conditions: &StoreConditions) -> Result<Vec<Quote>>;

    /// Reviews satisfying the conditions, with `book_title` filled in.
    async fn fetch_reviews(&self, conditions: &StoreConditions) -> Result<Vec<Review>>;

    /// Collections with their `book_count` filled in.
    async fn fetch_collections(&self, conditions: &StoreConditions) -> Result<Vec<Collection>>;

    /// Reading lists with their `book_count` filled in.
    async fn fetch_lists(&self, conditions: &StoreConditions) -> Result<Vec<ReadingList>>;

    /// Tags with their `book_count` filled in.
    async fn fetch_tags(&self, conditions: &StoreConditions) -> Result<Vec<Tag>>;

    /// Distinct authors with their book counts.
    async fn fetch_authors(&self) -> Result<Vec<AuthorSummary>>;
}

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for book CRUD operations.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book, returning its id.
    async fn insert(&self, book: &Book) -> Result<Uuid>;

    /// Get a book by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Book>>;

    /// Update the mutable fields of a book.
    async fn update(&self, book: &Book) -> Result<()>;

    /// Delete a book and everything attached to it.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// List books satisfying the conditions, ordered by title.
    async fn list(&self, conditions: &StoreConditions) -> Result<Vec<Book>>;

    /// Distinct authors with their book counts.
    async fn authors(&self) -> Result<Vec<AuthorSummary>>;
}

/// Repository for manual and smart collections.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Create a collection, returning its id.
    async fn create(&self, req: CreateCollectionRequest) -> Result<Uuid>;

    /// Get a collection by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Collection>>;

    /// Get a collection by its unique name.
    async fn get_by_name(&self, name: &str) -> Result<Option<Collection>>;

    /// List collections, pinned first, then by sort order and name.
    ///
    /// `collection_type` keeps only that kind; `pinned_only` keeps only
    /// pinned collections.
    async fn list(
        &self,
        collection_type: Option<CollectionType>,
        pinned_only: bool,
    ) -> Result<Vec<Collection>>;

    /// Apply the set fields of `req` and return the updated collection.
    async fn update(&self, id: Uuid, req: &UpdateCollectionRequest) -> Result<Collection>;

    /// Replace the criteria of a smart collection.
    async fn update_criteria(&self, id: Uuid, criteria: &FilterSet) -> Result<()>;

    /// Delete a collection. Member books are kept. Default collections
    /// cannot be deleted.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Append a book to a manual collection. A book already in the
    /// collection is rejected.
    async fn add_book(&self, collection_id: Uuid, book_id: Uuid, notes: Option<&str>)
        -> Result<()>;

    /// Change the position or notes of one member. `None` when the book is
    /// not in the collection.
    async fn update_book(
        &self,
        collection_id: Uuid,
        book_id: Uuid,
        update: &CollectionBookUpdate,
    ) -> Result<Option<CollectionBook>>;

    /// Remove a book from a manual collection.
    async fn remove_book(&self, collection_id: Uuid, book_id: Uuid) -> Result<()>;

    /// Rewrite member positions to follow `book_ids`.
    async fn reorder_books(&self, collection_id: Uuid, book_ids: &[Uuid]) -> Result<()>;

    /// Books in a collection: by position for manual collections, by
    /// evaluating the stored criteria for smart collections.
    async fn get_books(&self, id: Uuid, limit: usize, offset: usize) -> Result<Vec<Book>>;

    /// Number of books the collection currently holds.
    async fn book_count(&self, id: Uuid) -> Result<i64>;

    /// Manual collections containing a book.
    async fn collections_for_book(&self, book_id: Uuid) -> Result<Vec<Collection>>;

    /// Create the built-in smart collections that do not exist yet.
    async fn create_default_collections(&self) -> Result<Vec<Collection>>;
}
