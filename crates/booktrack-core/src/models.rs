//! Domain models for books and their related entities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{FieldValue, FilterSet, Filterable};
use crate::search::ResultType;
use crate::uuid_utils::new_v7;
use crate::Error;

// =============================================================================
// BOOKS
// =============================================================================

/// Reading status of a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Reading,
    Completed,
    Skimmed,
    /// On hold at a library.
    OnHold,
    /// Want to read.
    #[default]
    Wishlist,
    /// Did not finish.
    Dnf,
    /// Owned but not yet read.
    Owned,
}

impl BookStatus {
    pub const ALL: [BookStatus; 7] = [
        BookStatus::Reading,
        BookStatus::Completed,
        BookStatus::Skimmed,
        BookStatus::OnHold,
        BookStatus::Wishlist,
        BookStatus::Dnf,
        BookStatus::Owned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Reading => "reading",
            BookStatus::Completed => "completed",
            BookStatus::Skimmed => "skimmed",
            BookStatus::OnHold => "on_hold",
            BookStatus::Wishlist => "wishlist",
            BookStatus::Dnf => "dnf",
            BookStatus::Owned => "owned",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("unknown book status: {s}")))
    }
}

/// A book in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub status: BookStatus,
    /// Whole-star rating, 0 to 5.
    pub rating: Option<i64>,
    pub date_added: Option<NaiveDate>,
    pub date_started: Option<NaiveDate>,
    pub date_finished: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub page_count: Option<i64>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    pub series: Option<String>,
    pub series_index: Option<f64>,
    pub publication_year: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: new_v7(),
            title: title.into(),
            author: author.map(str::to_string),
            status: BookStatus::default(),
            rating: None,
            date_added: Some(now.date_naive()),
            date_started: None,
            date_finished: None,
            isbn: None,
            page_count: None,
            description: None,
            publisher: None,
            tags: Vec::new(),
            genres: Vec::new(),
            series: None,
            series_index: None,
            publication_year: None,
            created_at: now,
        }
    }

    pub fn with_status(mut self, status: BookStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_series(mut self, series: impl Into<String>, index: Option<f64>) -> Self {
        self.series = Some(series.into());
        self.series_index = index;
        self
    }

    pub fn with_publication_year(mut self, year: i64) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn with_date_finished(mut self, date: NaiveDate) -> Self {
        self.date_finished = Some(date);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

impl Filterable for Book {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "title" => FieldValue::Text(self.title.clone()),
            "author" => self.author.clone().into(),
            "status" => FieldValue::Text(self.status.as_str().to_string()),
            "rating" => self.rating.into(),
            "date_added" => self.date_added.into(),
            "date_started" => self.date_started.into(),
            "date_finished" => self.date_finished.into(),
            "isbn" => self.isbn.clone().into(),
            "page_count" => self.page_count.into(),
            "description" => self.description.clone().into(),
            "publisher" => self.publisher.clone().into(),
            "tags" => FieldValue::List(self.tags.clone()),
            "genres" => FieldValue::List(self.genres.clone()),
            "series" => self.series.clone().into(),
            "series_index" => self.series_index.into(),
            "publication_year" => self.publication_year.into(),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

/// An author aggregate synthesized by grouping books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub name: String,
    pub book_count: i64,
}

impl Filterable for AuthorSummary {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "name" | "author" => FieldValue::Text(self.name.clone()),
            "book_count" => FieldValue::Int(self.book_count),
            _ => return None,
        })
    }
}

// =============================================================================
// NOTES, QUOTES, REVIEWS
// =============================================================================

/// A reading note attached to a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub book_id: Uuid,
    /// Title of the parent book, joined at read time.
    pub book_title: Option<String>,
    pub note_type: String,
    pub title: Option<String>,
    pub content: String,
    pub chapter: Option<String>,
    pub page_number: Option<i64>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(book_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: new_v7(),
            book_id,
            book_title: None,
            note_type: "note".to_string(),
            title: None,
            content: content.into(),
            chapter: None,
            page_number: None,
            tags: Vec::new(),
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_note_type(mut self, note_type: impl Into<String>) -> Self {
        self.note_type = note_type.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

impl Filterable for Note {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "book_id" => FieldValue::Text(self.book_id.to_string()),
            "book_title" => self.book_title.clone().into(),
            "note_type" => FieldValue::Text(self.note_type.clone()),
            "title" => self.title.clone().into(),
            "content" => FieldValue::Text(self.content.clone()),
            "chapter" => self.chapter.clone().into(),
            "page_number" => self.page_number.into(),
            "tags" => FieldValue::List(self.tags.clone()),
            "is_favorite" => FieldValue::Bool(self.is_favorite),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

/// A quotation captured from a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    pub text: String,
    pub quote_type: String,
    pub speaker: Option<String>,
    pub context: Option<String>,
    pub chapter: Option<String>,
    pub page_number: Option<i64>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(book_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id: new_v7(),
            book_id,
            book_title: None,
            text: text.into(),
            quote_type: "quote".to_string(),
            speaker: None,
            context: None,
            chapter: None,
            page_number: None,
            tags: Vec::new(),
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }
}

impl Filterable for Quote {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "book_id" => FieldValue::Text(self.book_id.to_string()),
            "book_title" => self.book_title.clone().into(),
            "text" => FieldValue::Text(self.text.clone()),
            "quote_type" => FieldValue::Text(self.quote_type.clone()),
            "speaker" => self.speaker.clone().into(),
            "context" => self.context.clone().into(),
            "chapter" => self.chapter.clone().into(),
            "page_number" => self.page_number.into(),
            "tags" => FieldValue::List(self.tags.clone()),
            "is_favorite" => FieldValue::Bool(self.is_favorite),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

/// A review of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    /// Rating with half-star precision, 0.0 to 5.0.
    pub rating: Option<f64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub contains_spoilers: bool,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(book_id: Uuid) -> Self {
        Self {
            id: new_v7(),
            book_id,
            book_title: None,
            rating: None,
            title: None,
            content: None,
            contains_spoilers: false,
            is_favorite: false,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

impl Filterable for Review {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "book_id" => FieldValue::Text(self.book_id.to_string()),
            "book_title" => self.book_title.clone().into(),
            "rating" => self.rating.into(),
            "title" => self.title.clone().into(),
            "content" => self.content.clone().into(),
            "contains_spoilers" => FieldValue::Bool(self.contains_spoilers),
            "is_favorite" => FieldValue::Bool(self.is_favorite),
            "tags" => FieldValue::List(self.tags.clone()),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

// =============================================================================
// GROUPINGS
// =============================================================================

/// Whether a collection's membership is curated or computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Books are added by hand and ordered by position.
    #[default]
    Manual,
    /// Books are selected by a stored [`FilterSet`].
    Smart,
}

impl CollectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::Manual => "manual",
            CollectionType::Smart => "smart",
        }
    }
}

impl FromStr for CollectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(CollectionType::Manual),
            "smart" => Ok(CollectionType::Smart),
            other => Err(Error::InvalidInput(format!(
                "unknown collection type: {other}"
            ))),
        }
    }
}

/// A manual or smart collection of books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub collection_type: CollectionType,
    pub smart_criteria: Option<FilterSet>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i64,
    pub is_default: bool,
    pub is_pinned: bool,
    pub book_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Filterable for Collection {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "name" => FieldValue::Text(self.name.clone()),
            "description" => self.description.clone().into(),
            "collection_type" => FieldValue::Text(self.collection_type.as_str().to_string()),
            "icon" => self.icon.clone().into(),
            "color" => self.color.clone().into(),
            "sort_order" => FieldValue::Int(self.sort_order),
            "is_default" => FieldValue::Bool(self.is_default),
            "is_pinned" => FieldValue::Bool(self.is_pinned),
            "book_count" => FieldValue::Int(self.book_count),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

/// Fields for creating a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub collection_type: CollectionType,
    pub smart_criteria: Option<FilterSet>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
    pub is_pinned: bool,
}

impl CreateCollectionRequest {
    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn smart(name: impl Into<String>, criteria: FilterSet) -> Self {
        Self {
            name: name.into(),
            collection_type: CollectionType::Smart,
            smart_criteria: Some(criteria),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Partial update of a collection. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub is_pinned: Option<bool>,
    /// Only accepted for smart collections.
    pub smart_criteria: Option<FilterSet>,
}

impl UpdateCollectionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = Some(is_pinned);
        self
    }

    pub fn criteria(mut self, criteria: FilterSet) -> Self {
        self.smart_criteria = Some(criteria);
        self
    }
}

/// A book's membership row in a manual collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionBook {
    pub collection_id: Uuid,
    pub book_id: Uuid,
    pub position: i64,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Partial update of one membership row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionBookUpdate {
    pub position: Option<i64>,
    pub notes: Option<String>,
}

/// An ordered reading list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingList {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub book_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Filterable for ReadingList {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "name" => FieldValue::Text(self.name.clone()),
            "description" => self.description.clone().into(),
            "book_count" => FieldValue::Int(self.book_count),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

/// A user-defined tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
    pub book_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Filterable for Tag {
    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => FieldValue::Text(self.id.to_string()),
            "name" => FieldValue::Text(self.name.clone()),
            "color" => self.color.clone().into(),
            "description" => self.description.clone().into(),
            "book_count" => FieldValue::Int(self.book_count),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => return None,
        })
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// A row from any searchable entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Record {
    Book(Book),
    Note(Note),
    Quote(Quote),
    Review(Review),
    Collection(Collection),
    List(ReadingList),
    Tag(Tag),
    Author(AuthorSummary),
}

impl Record {
    pub fn result_type(&self) -> ResultType {
        match self {
            Record::Book(_) => ResultType::Book,
            Record::Note(_) => ResultType::Note,
            Record::Quote(_) => ResultType::Quote,
            Record::Review(_) => ResultType::Review,
            Record::Collection(_) => ResultType::Collection,
            Record::List(_) => ResultType::List,
            Record::Tag(_) => ResultType::Tag,
            Record::Author(_) => ResultType::Author,
        }
    }

    /// Record identifier. Authors are identified by name.
    pub fn id(&self) -> String {
        match self {
            Record::Book(b) => b.id.to_string(),
            Record::Note(n) => n.id.to_string(),
            Record::Quote(q) => q.id.to_string(),
            Record::Review(r) => r.id.to_string(),
            Record::Collection(c) => c.id.to_string(),
            Record::List(l) => l.id.to_string(),
            Record::Tag(t) => t.id.to_string(),
            Record::Author(a) => a.name.clone(),
        }
    }

    /// Creation timestamp. Synthesized authors have none.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Record::Book(b) => Some(b.created_at),
            Record::Note(n) => Some(n.created_at),
            Record::Quote(q) => Some(q.created_at),
            Record::Review(r) => Some(r.created_at),
            Record::Collection(c) => Some(c.created_at),
            Record::List(l) => Some(l.created_at),
            Record::Tag(t) => Some(t.created_at),
            Record::Author(_) => None,
        }
    }
}

impl Filterable for Record {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match self {
            Record::Book(b) => b.field(name),
            Record::Note(n) => n.field(name),
            Record::Quote(q) => q.field(name),
            Record::Review(r) => r.field(name),
            Record::Collection(c) => c.field(name),
            Record::List(l) => l.field(name),
            Record::Tag(t) => t.field(name),
            Record::Author(a) => a.field(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPredicate;

    #[test]
    fn test_book_status_round_trip() {
        for status in BookStatus::ALL {
            assert_eq!(status.as_str().parse::<BookStatus>().unwrap(), status);
        }
        assert_eq!("On-Hold".parse::<BookStatus>().unwrap(), BookStatus::OnHold);
        assert!("shelved".parse::<BookStatus>().is_err());
    }

    #[test]
    fn test_book_status_serde_matches_as_str() {
        let encoded = serde_json::to_value(BookStatus::OnHold).unwrap();
        assert_eq!(encoded, "on_hold");
    }

    #[test]
    fn test_book_fields() {
        let book = Book::new("Dune", Some("Frank Herbert"))
            .with_status(BookStatus::Reading)
            .with_rating(4)
            .with_genres(&["Science Fiction"]);

        assert_eq!(book.field("status"), Some(FieldValue::Text("reading".into())));
        assert_eq!(book.field("rating"), Some(FieldValue::Int(4)));
        assert_eq!(book.field("isbn"), Some(FieldValue::Null));
        assert_eq!(
            book.field("genres"),
            Some(FieldValue::List(vec!["Science Fiction".into()]))
        );
        assert_eq!(book.field("speaker"), None);
    }

    #[test]
    fn test_record_dispatches_to_entity_fields() {
        let book = Book::new("Dune", None);
        let quote =
            Record::Quote(Quote::new(book.id, "Fear is the mind-killer.").with_speaker("Paul"));

        assert_eq!(quote.result_type(), ResultType::Quote);
        assert_eq!(quote.field("speaker"), Some(FieldValue::Text("Paul".into())));
        assert!(FilterPredicate::new("rating", "gte", 5).evaluate(&quote));
    }

    #[test]
    fn test_criteria_helpers_against_books() {
        let mut dune = Book::new("Dune", Some("Frank Herbert"))
            .with_series("Dune Chronicles", Some(1.0))
            .with_publication_year(1965);
        dune.date_added = NaiveDate::from_ymd_opt(2024, 3, 10);
        let unsorted = Book::new("Solaris", Some("Stanisław Lem"));

        assert!(FilterPredicate::author_is("Frank Herbert").evaluate(&dune));
        assert!(!FilterPredicate::author_is("frank herbert").evaluate(&dune));
        assert!(FilterPredicate::series_is("Dune Chronicles").evaluate(&dune));
        assert!(!FilterPredicate::series_is("Dune Chronicles").evaluate(&unsorted));
        assert!(FilterPredicate::year_between(1960, 1969).evaluate(&dune));

        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(FilterPredicate::added_after(cutoff).evaluate(&dune));
        let later = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(!FilterPredicate::added_after(later).evaluate(&dune));
    }

    #[test]
    fn test_note_type_is_filterable() {
        let note = Note::new(new_v7(), "Arrakis ecology").with_note_type("summary");
        assert!(FilterPredicate::new("note_type", "eq", "summary").evaluate(&note));
    }

    #[test]
    fn test_author_record_has_no_timestamp() {
        let author = Record::Author(AuthorSummary {
            name: "Ursula K. Le Guin".into(),
            book_count: 3,
        });
        assert_eq!(author.id(), "Ursula K. Le Guin");
        assert!(author.created_at().is_none());
    }

    #[test]
    fn test_collection_type_parse() {
        assert_eq!("smart".parse::<CollectionType>().unwrap(), CollectionType::Smart);
        assert!("folder".parse::<CollectionType>().is_err());
    }

    #[test]
    fn test_create_collection_request_builders() {
        let req = CreateCollectionRequest::smart("Favorites", FilterSet::new())
            .with_icon("star")
            .as_default();
        assert_eq!(req.collection_type, CollectionType::Smart);
        assert!(req.is_default);
        assert_eq!(req.icon.as_deref(), Some("star"));
        assert_eq!(
            CreateCollectionRequest::manual("Shelf").collection_type,
            CollectionType::Manual
        );
    }
}
