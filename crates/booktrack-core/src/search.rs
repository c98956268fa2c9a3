//! Search request and response types.
//!
//! [`SearchQuery`] drives unified search across entity scopes,
//! [`AdvancedSearchQuery`] drives field-targeted search with boolean term
//! lists. Both produce a [`SearchResults`] page of [`SearchHit`]s.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::filter::{FilterSet, SortOrder};
use crate::models::BookStatus;
use crate::{Error, Result};

// =============================================================================
// ENUMS
// =============================================================================

/// Entity kind a search may cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    All,
    Books,
    Notes,
    Quotes,
    Reviews,
    Collections,
    Lists,
    Tags,
    Authors,
}

impl SearchScope {
    /// Every concrete scope, in the order the aggregator visits them.
    pub const CONCRETE: [SearchScope; 8] = [
        SearchScope::Books,
        SearchScope::Notes,
        SearchScope::Quotes,
        SearchScope::Reviews,
        SearchScope::Collections,
        SearchScope::Lists,
        SearchScope::Tags,
        SearchScope::Authors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::All => "all",
            SearchScope::Books => "books",
            SearchScope::Notes => "notes",
            SearchScope::Quotes => "quotes",
            SearchScope::Reviews => "reviews",
            SearchScope::Collections => "collections",
            SearchScope::Lists => "lists",
            SearchScope::Tags => "tags",
            SearchScope::Authors => "authors",
        }
    }

    /// Parse a scope name, returning `None` for names that match no scope.
    ///
    /// Callers drop unparseable names, so an unknown scope contributes no hits.
    pub fn parse_lenient(name: &str) -> Option<SearchScope> {
        let name = name.trim().to_lowercase();
        std::iter::once(SearchScope::All)
            .chain(SearchScope::CONCRETE)
            .find(|scope| scope.as_str() == name)
    }

    /// Expand a requested scope list into the concrete scopes to visit.
    ///
    /// `All` anywhere in the list selects every concrete scope. Duplicates
    /// are removed and visiting order is fixed.
    pub fn expand(requested: &[SearchScope]) -> Vec<SearchScope> {
        if requested.contains(&SearchScope::All) {
            return SearchScope::CONCRETE.to_vec();
        }
        SearchScope::CONCRETE
            .into_iter()
            .filter(|scope| requested.contains(scope))
            .collect()
    }

    /// Kind of hit a concrete scope produces. `All` has none.
    pub fn result_type(&self) -> Option<ResultType> {
        match self {
            SearchScope::All => None,
            SearchScope::Books => Some(ResultType::Book),
            SearchScope::Notes => Some(ResultType::Note),
            SearchScope::Quotes => Some(ResultType::Quote),
            SearchScope::Reviews => Some(ResultType::Review),
            SearchScope::Collections => Some(ResultType::Collection),
            SearchScope::Lists => Some(ResultType::List),
            SearchScope::Tags => Some(ResultType::Tag),
            SearchScope::Authors => Some(ResultType::Author),
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kind of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Book,
    Note,
    Quote,
    Review,
    Collection,
    List,
    Tag,
    Author,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Book => "book",
            ResultType::Note => "note",
            ResultType::Quote => "quote",
            ResultType::Review => "review",
            ResultType::Collection => "collection",
            ResultType::List => "list",
            ResultType::Tag => "tag",
            ResultType::Author => "author",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key the merged hit list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Descending relevance score, whatever the sort order.
    #[default]
    Relevance,
    /// `created_at`, missing dates first in ascending order.
    Date,
    /// Lower-cased title.
    Title,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Structured conditions layered on top of the free-text match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Books only.
    pub book_status: Option<BookStatus>,
    /// Books only, substring of any genre.
    pub genre: Option<String>,
    /// Books only, substring of the author.
    pub author: Option<String>,
    /// Books and reviews.
    pub min_rating: Option<f64>,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<DateTime<Utc>>,
    /// Notes and quotes only.
    #[serde(default)]
    pub favorites_only: bool,
}

/// A unified search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub scopes: Vec<SearchScope>,
    #[serde(default)]
    pub filters: SearchFilters,
    /// Extra predicates every hit's record must satisfy.
    #[serde(default)]
    pub filter_set: Option<FilterSet>,
    #[serde(default)]
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl SearchQuery {
    /// Search every scope, by relevance, with the default page size.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            scopes: vec![SearchScope::All],
            filters: SearchFilters::default(),
            filter_set: None,
            sort_by: SortBy::Relevance,
            sort_order: SortOrder::Desc,
            limit: defaults::PAGE_LIMIT_SEARCH,
            offset: defaults::PAGE_OFFSET,
        }
    }

    pub fn with_scopes(mut self, scopes: &[SearchScope]) -> Self {
        self.scopes = scopes.to_vec();
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_filter_set(mut self, set: FilterSet) -> Self {
        self.filter_set = Some(set);
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = order;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Check request bounds before any store access.
    pub fn validate(&self) -> Result<()> {
        validate_query_text(&self.query)?;
        validate_limit(self.limit)?;
        if let Some(rating) = self.filters.min_rating {
            validate_rating(rating)?;
        }
        if let (Some(from), Some(to)) = (self.filters.date_from, self.filters.date_to) {
            if from > to {
                return Err(Error::InvalidInput(
                    "date_from must not be after date_to".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A field-targeted search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub tag: Option<String>,
    pub genre: Option<String>,
    /// Every term must appear in the record's searchable text.
    #[serde(default)]
    pub must_include: Vec<String>,
    /// Each term found raises the score.
    #[serde(default)]
    pub should_include: Vec<String>,
    /// Any term found excludes the record.
    #[serde(default)]
    pub must_exclude: Vec<String>,
    pub scopes: Vec<SearchScope>,
    #[serde(default)]
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: usize,
}

impl Default for AdvancedSearchQuery {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            content: None,
            tag: None,
            genre: None,
            must_include: Vec::new(),
            should_include: Vec::new(),
            must_exclude: Vec::new(),
            scopes: vec![SearchScope::Books, SearchScope::Notes, SearchScope::Quotes],
            sort_by: SortBy::Relevance,
            sort_order: SortOrder::Desc,
            limit: defaults::PAGE_LIMIT_SEARCH,
        }
    }
}

impl AdvancedSearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn must_include(mut self, term: impl Into<String>) -> Self {
        self.must_include.push(term.into());
        self
    }

    pub fn should_include(mut self, term: impl Into<String>) -> Self {
        self.should_include.push(term.into());
        self
    }

    pub fn must_exclude(mut self, term: impl Into<String>) -> Self {
        self.must_exclude.push(term.into());
        self
    }

    pub fn with_scopes(mut self, scopes: &[SearchScope]) -> Self {
        self.scopes = scopes.to_vec();
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = order;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for text in [&self.title, &self.author, &self.content, &self.tag, &self.genre]
            .into_iter()
            .flatten()
        {
            validate_query_text(text)?;
        }
        validate_limit(self.limit)
    }

    /// Human-readable rendering such as `title:dune +(spice) -(sandworm)`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(title) = &self.title {
            parts.push(format!("title:{title}"));
        }
        if let Some(author) = &self.author {
            parts.push(format!("author:{author}"));
        }
        if let Some(content) = &self.content {
            parts.push(format!("content:{content}"));
        }
        if let Some(tag) = &self.tag {
            parts.push(format!("tag:{tag}"));
        }
        if !self.must_include.is_empty() {
            parts.push(format!("+({})", self.must_include.join(" ")));
        }
        if !self.should_include.is_empty() {
            parts.push(format!("({})", self.should_include.join(" ")));
        }
        if !self.must_exclude.is_empty() {
            parts.push(format!("-({})", self.must_exclude.join(" ")));
        }
        if parts.is_empty() {
            "advanced search".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Reject query text longer than [`defaults::MAX_QUERY_LENGTH`] characters.
pub fn validate_query_text(text: &str) -> Result<()> {
    let len = text.chars().count();
    if len > defaults::MAX_QUERY_LENGTH {
        return Err(Error::InvalidInput(format!(
            "query must be at most {} characters, got {len}",
            defaults::MAX_QUERY_LENGTH
        )));
    }
    Ok(())
}

/// Reject page sizes outside `1..=`[`defaults::PAGE_LIMIT_SEARCH_MAX`].
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 || limit > defaults::PAGE_LIMIT_SEARCH_MAX {
        return Err(Error::InvalidInput(format!(
            "limit must be between 1 and {}, got {limit}",
            defaults::PAGE_LIMIT_SEARCH_MAX
        )));
    }
    Ok(())
}

/// Reject rating floors outside the rating scale.
pub fn validate_rating(rating: f64) -> Result<()> {
    if !(defaults::RATING_MIN..=defaults::RATING_MAX).contains(&rating) {
        return Err(Error::InvalidInput(format!(
            "min_rating must be between {} and {}, got {rating}",
            defaults::RATING_MIN,
            defaults::RATING_MAX
        )));
    }
    Ok(())
}

// =============================================================================
// RESPONSES
// =============================================================================

/// One ranked result item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub result_type: ResultType,
    pub title: String,
    pub subtitle: Option<String>,
    pub snippet: Option<String>,
    /// Heuristic score in `[0, 1]`.
    pub relevance_score: f64,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Hit counts for UI faceting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFacets {
    /// Hits per entity kind, before pagination.
    #[serde(rename = "type")]
    pub result_type: BTreeMap<String, usize>,
    /// Book hits per reading status.
    pub status: BTreeMap<String, usize>,
    /// Book hits per genre.
    pub genre: BTreeMap<String, usize>,
}

impl SearchFacets {
    pub fn type_count(&self, result_type: ResultType) -> usize {
        self.result_type
            .get(result_type.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    /// Hits before pagination.
    pub total_count: usize,
    pub results: Vec<SearchHit>,
    pub has_more: bool,
    pub facets: SearchFacets,
    /// Wall-clock time of the call, for observability only.
    pub search_time_ms: f64,
}

/// One autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub text: String,
    pub result_type: ResultType,
    pub count: i64,
}

/// Autocomplete candidates for a partial query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestions {
    pub query: String,
    pub suggestions: Vec<SearchSuggestion>,
}

// =============================================================================
// ENTITY-SPECIFIC RESULTS
// =============================================================================

/// Book match from an entity-specific search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSearchResult {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub status: BookStatus,
    pub rating: Option<i64>,
    pub genres: Vec<String>,
    pub snippet: Option<String>,
    pub relevance_score: f64,
}

/// Note match from an entity-specific search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSearchResult {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    pub title: Option<String>,
    pub note_type: String,
    pub snippet: Option<String>,
    pub relevance_score: f64,
}

/// Quote match from an entity-specific search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSearchResult {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    pub text: String,
    pub speaker: Option<String>,
    pub relevance_score: f64,
}

/// Review match from an entity-specific search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSearchResult {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: Option<String>,
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub snippet: Option<String>,
    pub relevance_score: f64,
}
