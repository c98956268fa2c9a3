use async_trait::async_trait;

use booktrack_core::{
    AuthorSummary, Book, BookRepository, Collection, CollectionRepository, Note, Quote,
    ReadingList, RecordStore, Result, Review, StoreConditions, Tag,
};

use crate::Database;

#[async_trait]
impl RecordStore for Database {
    async fn fetch_books(&self, conditions: &StoreConditions) -> Result<Vec<Book>> {
        self.books.list(conditions).await
    }

    async fn fetch_notes(&self, conditions: &StoreConditions) -> Result<Vec<Note>> {
        self.notes.list(conditions).await
    }

    async fn fetch_quotes(&self, conditions: &StoreConditions) -> Result<Vec<Quote>> {
        self.quotes.list(conditions).await
    }

    async fn fetch_reviews(&self, conditions: &StoreConditions) -> Result<Vec<Review>> {
        self.reviews.list(conditions).await
    }

    async fn fetch_collections(&self, conditions: &StoreConditions) -> Result<Vec<Collection>> {
        let collections = self.collections.list(None, false).await?;
        Ok(collections
            .into_iter()
            .filter(|c| conditions.admits_collection(c))
            .collect())
    }

    async fn fetch_lists(&self, conditions: &StoreConditions) -> Result<Vec<ReadingList>> {
        self.lists.list(conditions).await
    }

    async fn fetch_tags(&self, conditions: &StoreConditions) -> Result<Vec<Tag>> {
        self.tags.list(conditions).await
    }

    async fn fetch_authors(&self) -> Result<Vec<AuthorSummary>> {
        self.books.authors().await
    }
}
