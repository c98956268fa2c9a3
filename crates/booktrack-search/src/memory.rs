//! In-memory record store for tests and embedding.
//!
//! Holds plain vectors of records and answers [`RecordStore`] fetches by
//! applying [`StoreConditions`] the same way the SQLite repositories do.
//!
//! ## Usage
//!
//! ```rust
//! use booktrack_search::{Book, InMemoryStore, Note};
//!
//! let dune = Book::new("Dune", Some("Frank Herbert"));
//! let store = InMemoryStore::new()
//!     .with_note(Note::new(dune.id, "Fear is the mind-killer"))
//!     .with_book(dune);
//! assert_eq!(store.book_count(), 1);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use booktrack_core::{
    AuthorSummary, Book, Collection, CollectionType, Error, Note, Quote, ReadingList,
    RecordStore, Result, Review, StoreConditions, Tag,
};

#[derive(Debug, Clone, Default)]
struct Records {
    books: Vec<Book>,
    notes: Vec<Note>,
    quotes: Vec<Quote>,
    reviews: Vec<Review>,
    collections: Vec<Collection>,
    lists: Vec<ReadingList>,
    tags: Vec<Tag>,
    failure: Option<String>,
}

/// Read-only store over records held in memory.
///
/// Notes, quotes and reviews get their `book_title` filled from the stored
/// books when they lack one. Smart collections report the number of stored
/// books their criteria select.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<Records>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, book: Book) -> Self {
        Arc::make_mut(&mut self.records).books.push(book);
        self
    }

    pub fn with_books(mut self, books: impl IntoIterator<Item = Book>) -> Self {
        Arc::make_mut(&mut self.records).books.extend(books);
        self
    }

    pub fn with_note(mut self, note: Note) -> Self {
        Arc::make_mut(&mut self.records).notes.push(note);
        self
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        Arc::make_mut(&mut self.records).quotes.push(quote);
        self
    }

    pub fn with_review(mut self, review: Review) -> Self {
        Arc::make_mut(&mut self.records).reviews.push(review);
        self
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        Arc::make_mut(&mut self.records).collections.push(collection);
        self
    }

    pub fn with_list(mut self, list: ReadingList) -> Self {
        Arc::make_mut(&mut self.records).lists.push(list);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        Arc::make_mut(&mut self.records).tags.push(tag);
        self
    }

    /// Make every fetch fail with [`Error::Internal`].
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.records).failure = Some(message.into());
        self
    }

    pub fn book_count(&self) -> usize {
        self.records.books.len()
    }

    fn check(&self) -> Result<()> {
        match &self.records.failure {
            Some(message) => Err(Error::Internal(message.clone())),
            None => Ok(()),
        }
    }

    fn book_title(&self, book_id: Uuid) -> Option<String> {
        self.records
            .books
            .iter()
            .find(|b| b.id == book_id)
            .map(|b| b.title.clone())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn fetch_books(&self, conditions: &StoreConditions) -> Result<Vec<Book>> {
        self.check()?;
        Ok(self
            .records
            .books
            .iter()
            .filter(|b| conditions.admits_book(b))
            .cloned()
            .collect())
    }

    async fn fetch_notes(&self, conditions: &StoreConditions) -> Result<Vec<Note>> {
        self.check()?;
        Ok(self
            .records
            .notes
            .iter()
            .filter(|n| conditions.admits_note(n))
            .map(|n| {
                let mut note = n.clone();
                if note.book_title.is_none() {
                    note.book_title = self.book_title(note.book_id);
                }
                note
            })
            .collect())
    }

    async fn fetch_quotes(&self, conditions: &StoreConditions) -> Result<Vec<Quote>> {
        self.check()?;
        Ok(self
            .records
            .quotes
            .iter()
            .filter(|q| conditions.admits_quote(q))
            .map(|q| {
                let mut quote = q.clone();
                if quote.book_title.is_none() {
                    quote.book_title = self.book_title(quote.book_id);
                }
                quote
            })
            .collect())
    }

    async fn fetch_reviews(&self, conditions: &StoreConditions) -> Result<Vec<Review>> {
        self.check()?;
        Ok(self
            .records
            .reviews
            .iter()
            .filter(|r| conditions.admits_review(r))
            .map(|r| {
                let mut review = r.clone();
                if review.book_title.is_none() {
                    review.book_title = self.book_title(review.book_id);
                }
                review
            })
            .collect())
    }

    async fn fetch_collections(&self, conditions: &StoreConditions) -> Result<Vec<Collection>> {
        self.check()?;
        Ok(self
            .records
            .collections
            .iter()
            .filter(|c| conditions.admits_collection(c))
            .map(|c| {
                let mut collection = c.clone();
                if collection.collection_type == CollectionType::Smart {
                    collection.book_count = match &collection.smart_criteria {
                        Some(criteria) => criteria.count(&self.records.books) as i64,
                        None => 0,
                    };
                }
                collection
            })
            .collect())
    }

    async fn fetch_lists(&self, conditions: &StoreConditions) -> Result<Vec<ReadingList>> {
        self.check()?;
        Ok(self
            .records
            .lists
            .iter()
            .filter(|l| conditions.admits_list(l))
            .cloned()
            .collect())
    }

    async fn fetch_tags(&self, conditions: &StoreConditions) -> Result<Vec<Tag>> {
        self.check()?;
        Ok(self
            .records
            .tags
            .iter()
            .filter(|t| conditions.admits_tag(t))
            .cloned()
            .collect())
    }

    async fn fetch_authors(&self) -> Result<Vec<AuthorSummary>> {
        self.check()?;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for author in self.records.books.iter().filter_map(|b| b.author.as_deref()) {
            *counts.entry(author).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(name, book_count)| AuthorSummary {
                name: name.to_string(),
                book_count,
            })
            .collect())
    }
}
