//! Unified search aggregator.
//!
//! [`SearchManager`] fans a query out over the requested entity scopes of a
//! [`RecordStore`], merges the hits, ranks them, and returns one page with
//! facet counts. Scopes are visited sequentially in a fixed order and any
//! store failure aborts the whole search.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, field, info, instrument, Span};
use uuid::Uuid;

use booktrack_core::{
    defaults, logging, validate_limit, validate_query_text, validate_rating, AdvancedSearchQuery,
    BookSearchResult, BookStatus, BooktrackConfig, NoteSearchResult, QuoteSearchResult,
    Record, RecordStore, Result, ResultType, ReviewSearchResult, SearchQuery, SearchResults,
    SearchScope, SearchSuggestion, SearchSuggestions, StoreConditions,
};

use crate::ranking::{paginate, sort_hits, FacetCounter};
use crate::relevance::{calculate_relevance, create_snippet};
use crate::scopes::{
    advanced_text, book_matches, matches_query, matches_target, note_matches, quote_matches,
    review_matches, to_advanced_hit, to_hit, TargetField,
};

/// Search entry point over any [`RecordStore`].
#[derive(Clone)]
pub struct SearchManager {
    store: Arc<dyn RecordStore>,
    snippet_length: usize,
}

impl SearchManager {
    /// Create a manager with the default snippet length.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            snippet_length: defaults::SNIPPET_LENGTH,
        }
    }

    /// Create a manager using the tunables of a loaded configuration.
    pub fn with_config(store: Arc<dyn RecordStore>, config: &BooktrackConfig) -> Self {
        Self::new(store).with_snippet_length(config.snippet_length)
    }

    /// Override the snippet length used when the query is not found.
    pub fn with_snippet_length(mut self, snippet_length: usize) -> Self {
        self.snippet_length = snippet_length;
        self
    }

    async fn fetch_scope(
        &self,
        scope: SearchScope,
        conditions: &StoreConditions,
    ) -> Result<Vec<Record>> {
        let records = match scope {
            SearchScope::Books => wrap(self.store.fetch_books(conditions).await?, Record::Book),
            SearchScope::Notes => wrap(self.store.fetch_notes(conditions).await?, Record::Note),
            SearchScope::Quotes => wrap(self.store.fetch_quotes(conditions).await?, Record::Quote),
            SearchScope::Reviews => {
                wrap(self.store.fetch_reviews(conditions).await?, Record::Review)
            }
            SearchScope::Collections => wrap(
                self.store.fetch_collections(conditions).await?,
                Record::Collection,
            ),
            SearchScope::Lists => wrap(self.store.fetch_lists(conditions).await?, Record::List),
            SearchScope::Tags => wrap(self.store.fetch_tags(conditions).await?, Record::Tag),
            SearchScope::Authors => wrap(self.store.fetch_authors().await?, Record::Author),
            SearchScope::All => Vec::new(),
        };
        Ok(records)
    }

    /// Free-text search across the requested scopes.
    #[instrument(skip(self, query), fields(
        subsystem = "search",
        component = "manager",
        op = "search",
        query = %query.query,
        total_count = field::Empty,
    ))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let start = Instant::now();
        query.validate()?;

        let needle = query.query.to_lowercase();
        let conditions = StoreConditions::from(&query.filters);
        let mut facets = FacetCounter::new();
        let mut hits = Vec::new();

        for scope in SearchScope::expand(&query.scopes) {
            if let Some(kind) = scope.result_type() {
                facets.touch(kind);
            }
            let records = self.fetch_scope(scope, &conditions).await?;
            let before = hits.len();
            for record in records {
                if !matches_query(&record, &needle) {
                    continue;
                }
                if let Some(set) = &query.filter_set {
                    if !set.matches(&record) {
                        continue;
                    }
                }
                facets.record(&record);
                hits.push(to_hit(&record, &needle, self.snippet_length));
            }
            debug!(
                scope = %scope,
                result_count = hits.len() - before,
                "Scope searched"
            );
        }

        sort_hits(&mut hits, query.sort_by, query.sort_order);
        let page = paginate(hits, query.offset, query.limit);
        let elapsed = start.elapsed();
        Span::current().record(logging::TOTAL_COUNT, page.total);

        info!(
            total_count = page.total,
            result_count = page.items.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Search completed"
        );

        Ok(SearchResults {
            query: query.query.clone(),
            total_count: page.total,
            results: page.items,
            has_more: page.has_more,
            facets: facets.finish(),
            search_time_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }

    /// Field-targeted search over books, notes and quotes.
    #[instrument(skip(self, query), fields(
        subsystem = "search",
        component = "manager",
        op = "advanced_search",
        total_count = field::Empty,
    ))]
    pub async fn advanced_search(&self, query: &AdvancedSearchQuery) -> Result<SearchResults> {
        let start = Instant::now();
        query.validate()?;

        let targets: Vec<(TargetField, String)> = [
            (TargetField::Title, &query.title),
            (TargetField::Author, &query.author),
            (TargetField::Content, &query.content),
            (TargetField::Tag, &query.tag),
            (TargetField::Genre, &query.genre),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field, v.to_lowercase())))
        .collect();
        let must = lowercase_all(&query.must_include);
        let should = lowercase_all(&query.should_include);
        let exclude = lowercase_all(&query.must_exclude);

        let scopes: Vec<SearchScope> = SearchScope::expand(&query.scopes)
            .into_iter()
            .filter(|s| {
                matches!(
                    s,
                    SearchScope::Books | SearchScope::Notes | SearchScope::Quotes
                )
            })
            .collect();

        let conditions = StoreConditions::new();
        let mut facets = FacetCounter::new();
        let mut hits = Vec::new();

        for scope in scopes {
            if let Some(kind) = scope.result_type() {
                facets.touch(kind);
            }
            for record in self.fetch_scope(scope, &conditions).await? {
                if !targets
                    .iter()
                    .all(|(field, needle)| matches_target(&record, *field, needle))
                {
                    continue;
                }
                let Some(text) = advanced_text(&record) else {
                    continue;
                };
                let lower = text.to_lowercase();
                if !must.iter().all(|t| lower.contains(t.as_str())) {
                    continue;
                }
                if exclude.iter().any(|t| lower.contains(t.as_str())) {
                    continue;
                }
                let bonus = should.iter().filter(|t| lower.contains(t.as_str())).count();
                let score = (defaults::ADVANCED_BASE_SCORE
                    + bonus as f64 * defaults::ADVANCED_SHOULD_BONUS)
                    .min(1.0);

                facets.record(&record);
                hits.push(to_advanced_hit(&record, &text, score, self.snippet_length));
            }
        }

        sort_hits(&mut hits, query.sort_by, query.sort_order);
        let page = paginate(hits, 0, query.limit);
        let elapsed = start.elapsed();
        Span::current().record(logging::TOTAL_COUNT, page.total);

        info!(
            filter_count = targets.len() + must.len() + should.len() + exclude.len(),
            total_count = page.total,
            result_count = page.items.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Advanced search completed"
        );

        Ok(SearchResults {
            query: query.describe(),
            total_count: page.total,
            results: page.items,
            has_more: page.has_more,
            facets: facets.finish(),
            search_time_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }

    // =========================================================================
    // ENTITY-SPECIFIC SEARCH
    // =========================================================================

    /// Search books only, best match first.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "manager",
        op = "search_books",
    ))]
    pub async fn search_books(
        &self,
        query: &str,
        status: Option<BookStatus>,
        genre: Option<&str>,
        min_rating: Option<f64>,
        limit: usize,
    ) -> Result<Vec<BookSearchResult>> {
        validate_entity_request(query, limit, min_rating)?;
        let needle = query.to_lowercase();
        let conditions = StoreConditions {
            status,
            genre: genre.map(str::to_string),
            min_rating,
            ..StoreConditions::default()
        };

        let mut results: Vec<BookSearchResult> = self
            .store
            .fetch_books(&conditions)
            .await?
            .into_iter()
            .filter(|b| book_matches(b, &needle))
            .map(|b| {
                let source = format!(
                    "{} by {}. {}",
                    b.title,
                    b.author.as_deref().unwrap_or("Unknown"),
                    b.description.as_deref().unwrap_or_default()
                );
                let relevance_score = calculate_relevance(
                    &needle,
                    &[Some(b.title.as_str()), b.author.as_deref(), b.description.as_deref()],
                );
                BookSearchResult {
                    id: b.id,
                    snippet: Some(create_snippet(&source, &needle, self.snippet_length)),
                    relevance_score,
                    title: b.title,
                    author: b.author,
                    status: b.status,
                    rating: b.rating,
                    genres: b.genres,
                }
            })
            .collect();

        rank_entities(&mut results, |r| r.relevance_score, limit);
        debug!(result_count = results.len(), "Book search completed");
        Ok(results)
    }

    /// Search notes only, optionally within one book or note type.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "manager",
        op = "search_notes",
    ))]
    pub async fn search_notes(
        &self,
        query: &str,
        book_id: Option<Uuid>,
        note_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<NoteSearchResult>> {
        validate_entity_request(query, limit, None)?;
        let needle = query.to_lowercase();
        let conditions = StoreConditions {
            book_id,
            note_type: note_type.map(str::to_string),
            ..StoreConditions::default()
        };

        let mut results: Vec<NoteSearchResult> = self
            .store
            .fetch_notes(&conditions)
            .await?
            .into_iter()
            .filter(|n| note_matches(n, &needle))
            .map(|n| {
                let source = format!("{} {}", n.title.as_deref().unwrap_or_default(), n.content);
                NoteSearchResult {
                    id: n.id,
                    book_id: n.book_id,
                    relevance_score: calculate_relevance(
                        &needle,
                        &[n.title.as_deref(), Some(n.content.as_str())],
                    ),
                    snippet: Some(create_snippet(&source, &needle, self.snippet_length)),
                    book_title: n.book_title,
                    title: n.title,
                    note_type: n.note_type,
                }
            })
            .collect();

        rank_entities(&mut results, |r| r.relevance_score, limit);
        debug!(result_count = results.len(), "Note search completed");
        Ok(results)
    }

    /// Search quotes only. Tags count as searchable text here.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "manager",
        op = "search_quotes",
    ))]
    pub async fn search_quotes(
        &self,
        query: &str,
        book_id: Option<Uuid>,
        speaker: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QuoteSearchResult>> {
        validate_entity_request(query, limit, None)?;
        let needle = query.to_lowercase();
        let conditions = StoreConditions {
            book_id,
            speaker: speaker.map(str::to_string),
            ..StoreConditions::default()
        };

        let mut results: Vec<QuoteSearchResult> = self
            .store
            .fetch_quotes(&conditions)
            .await?
            .into_iter()
            .filter(|q| {
                quote_matches(q, &needle)
                    || q.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .map(|q| QuoteSearchResult {
                id: q.id,
                book_id: q.book_id,
                relevance_score: calculate_relevance(
                    &needle,
                    &[
                        Some(q.text.as_str()),
                        q.speaker.as_deref(),
                        q.context.as_deref(),
                    ],
                ),
                text: create_snippet(&q.text, &needle, self.snippet_length),
                book_title: q.book_title,
                speaker: q.speaker,
            })
            .collect();

        rank_entities(&mut results, |r| r.relevance_score, limit);
        debug!(result_count = results.len(), "Quote search completed");
        Ok(results)
    }

    /// Search reviews only, optionally within one book or above a rating.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "manager",
        op = "search_reviews",
    ))]
    pub async fn search_reviews(
        &self,
        query: &str,
        book_id: Option<Uuid>,
        min_rating: Option<f64>,
        limit: usize,
    ) -> Result<Vec<ReviewSearchResult>> {
        validate_entity_request(query, limit, min_rating)?;
        let needle = query.to_lowercase();
        let conditions = StoreConditions {
            book_id,
            min_rating,
            ..StoreConditions::default()
        };

        let mut results: Vec<ReviewSearchResult> = self
            .store
            .fetch_reviews(&conditions)
            .await?
            .into_iter()
            .filter(|r| review_matches(r, &needle))
            .map(|r| {
                let source = format!(
                    "{} {}",
                    r.title.as_deref().unwrap_or_default(),
                    r.content.as_deref().unwrap_or_default()
                );
                ReviewSearchResult {
                    id: r.id,
                    book_id: r.book_id,
                    relevance_score: calculate_relevance(
                        &needle,
                        &[r.title.as_deref(), r.content.as_deref()],
                    ),
                    snippet: Some(create_snippet(&source, &needle, self.snippet_length)),
                    book_title: r.book_title,
                    title: r.title,
                    rating: r.rating,
                }
            })
            .collect();

        rank_entities(&mut results, |r| r.relevance_score, limit);
        debug!(result_count = results.len(), "Review search completed");
        Ok(results)
    }

    // =========================================================================
    // SUGGESTIONS
    // =========================================================================

    /// Autocomplete candidates from book titles and authors.
    ///
    /// Prefix matches come first, then higher counts, then shorter text.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "manager",
        op = "suggestions",
    ))]
    pub async fn suggestions(&self, prefix: &str, limit: usize) -> Result<SearchSuggestions> {
        validate_entity_request(prefix, limit, None)?;
        let needle = prefix.to_lowercase();
        let mut suggestions = Vec::new();

        let mut seen = HashSet::new();
        for book in self.store.fetch_books(&StoreConditions::new()).await? {
            if seen.len() == limit {
                break;
            }
            if book.title.to_lowercase().contains(&needle) && seen.insert(book.title.clone()) {
                suggestions.push(SearchSuggestion {
                    text: book.title,
                    result_type: ResultType::Book,
                    count: 1,
                });
            }
        }

        suggestions.extend(
            self.store
                .fetch_authors()
                .await?
                .into_iter()
                .filter(|a| a.name.to_lowercase().contains(&needle))
                .take(limit)
                .map(|a| SearchSuggestion {
                    text: a.name,
                    result_type: ResultType::Author,
                    count: a.book_count,
                }),
        );

        suggestions.sort_by_cached_key(|s| {
            (
                !s.text.to_lowercase().starts_with(&needle),
                Reverse(s.count),
                s.text.chars().count(),
            )
        });
        suggestions.truncate(limit);

        debug!(result_count = suggestions.len(), "Suggestions computed");
        Ok(SearchSuggestions {
            query: prefix.to_string(),
            suggestions,
        })
    }
}

fn wrap<T>(items: Vec<T>, variant: fn(T) -> Record) -> Vec<Record> {
    items.into_iter().map(variant).collect()
}

fn lowercase_all(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}

fn validate_entity_request(query: &str, limit: usize, min_rating: Option<f64>) -> Result<()> {
    validate_query_text(query)?;
    validate_limit(limit)?;
    if let Some(rating) = min_rating {
        validate_rating(rating)?;
    }
    Ok(())
}

/// Stable sort by descending score, then cap at `limit`.
fn rank_entities<T>(results: &mut Vec<T>, score: impl Fn(&T) -> f64, limit: usize) {
    results.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use booktrack_core::{Book, Error, Note, Quote, Review, SortBy, SortOrder};

    fn manager(store: InMemoryStore) -> SearchManager {
        SearchManager::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_search_rejects_invalid_request_before_store() {
        let mgr = manager(InMemoryStore::new().with_failure("should not be called"));
        let err = mgr
            .search(&SearchQuery::new("x").with_limit(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mgr = manager(InMemoryStore::new().with_failure("boom"));
        let err = mgr.search(&SearchQuery::new("x")).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_search_books_snippet_and_order() {
        let store = InMemoryStore::new().with_books([
            Book::new("Children of Dune", None),
            Book::new("Dune", Some("Frank Herbert")),
        ]);
        let results = manager(store)
            .search_books("dune", None, None, None, 20)
            .await
            .unwrap();
        assert_eq!(results[0].title, "Dune");
        assert_eq!(results[0].snippet.as_deref(), Some("Dune by Frank Herbert. "));
        assert_eq!(
            results[1].snippet.as_deref(),
            Some("Children of Dune by Unknown. ")
        );
    }

    #[tokio::test]
    async fn test_search_books_limit_after_ranking() {
        let store = InMemoryStore::new().with_books([
            Book::new("About dune", None),
            Book::new("dune", None),
        ]);
        let results = manager(store)
            .search_books("dune", None, None, None, 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "dune");
    }

    #[tokio::test]
    async fn test_search_notes_filters_by_book() {
        let a = Book::new("A", None);
        let b = Book::new("B", None);
        let store = InMemoryStore::new()
            .with_note(Note::new(a.id, "shared words"))
            .with_note(Note::new(b.id, "shared words"))
            .with_books([a.clone(), b]);
        let results = manager(store)
            .search_notes("shared", Some(a.id), None, 20)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].book_title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_search_quotes_matches_tags_and_speaker_filter() {
        let book = Book::new("Slaughterhouse-Five", None);
        let store = InMemoryStore::new()
            .with_quote(
                Quote::new(book.id, "So it goes.")
                    .with_speaker("Narrator")
                    .with_tags(&["fatalism"]),
            )
            .with_quote(Quote::new(book.id, "Listen:").with_speaker("Billy"))
            .with_book(book);
        let mgr = manager(store);

        let results = mgr.search_quotes("fatal", None, None, 20).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "So it goes.");

        let results = mgr.search_quotes("", None, Some("bil"), 20).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].speaker.as_deref(), Some("Billy"));
    }

    #[tokio::test]
    async fn test_search_reviews_min_rating() {
        let book = Book::new("Dune", None);
        let store = InMemoryStore::new()
            .with_review(Review::new(book.id).with_rating(4.5).with_content("epic"))
            .with_review(Review::new(book.id).with_rating(2.0).with_content("epic slog"))
            .with_book(book);
        let results = manager(store)
            .search_reviews("epic", None, Some(4.0), 20)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rating, Some(4.5));
        assert_eq!(results[0].book_title.as_deref(), Some("Dune"));
    }

    #[tokio::test]
    async fn test_filter_set_post_filters_hits() {
        let store = InMemoryStore::new().with_books([
            Book::new("Dune", None).with_rating(5),
            Book::new("Dune Messiah", None).with_rating(3),
        ]);
        let query = SearchQuery::new("dune")
            .with_scopes(&[SearchScope::Books])
            .with_filter_set(
                booktrack_core::FilterSet::new()
                    .with(booktrack_core::FilterPredicate::rating_gte(4)),
            )
            .with_sort(SortBy::Title, SortOrder::Asc);
        let results = manager(store).search(&query).await.unwrap();
        assert_eq!(results.total_count, 1);
        assert_eq!(results.results[0].title, "Dune");
    }
}
