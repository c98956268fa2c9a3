use std::sync::Arc;

use booktrack_search::{
    AdvancedSearchQuery, Book, BookStatus, Error, InMemoryStore, Note, Quote, ResultType,
    SearchFilters, SearchManager, SearchQuery, SearchScope, SortBy, SortOrder,
};
use chrono::{Duration, TimeZone, Utc};

fn manager(store: InMemoryStore) -> SearchManager {
    SearchManager::new(Arc::new(store))
}

fn gatsby() -> Book {
    Book::new("The Great Gatsby", Some("F. Scott Fitzgerald"))
        .with_status(BookStatus::Completed)
        .with_rating(5)
        .with_genres(&["Classic", "Literary Fiction"])
        .with_description("A portrait of the Jazz Age and the green light across the bay.")
}

fn library() -> InMemoryStore {
    let gatsby = gatsby();
    let brave = Book::new("Brave New World", Some("Aldous Huxley"))
        .with_status(BookStatus::Completed)
        .with_rating(4)
        .with_genres(&["Science Fiction"])
        .with_description("A dystopian society engineered for stability.");
    let dispossessed = Book::new("The Dispossessed", Some("Ursula K. Le Guin"))
        .with_status(BookStatus::Reading)
        .with_genres(&["Science Fiction"])
        .with_description("An ambiguous utopia on twin worlds.");

    InMemoryStore::new()
        .with_note(
            Note::new(gatsby.id, "Nick narrates from a distance.")
                .with_title("Narration")
                .with_tags(&["style"]),
        )
        .with_note(Note::new(brave.id, "Soma as social control.").favorite())
        .with_quote(
            Quote::new(gatsby.id, "So we beat on, boats against the current.")
                .with_speaker("Nick Carraway"),
        )
        .with_books([gatsby, brave, dispossessed])
}

#[tokio::test]
async fn test_gatsby_single_book_hit() {
    let store = InMemoryStore::new().with_book(gatsby());
    let results = manager(store)
        .search(&SearchQuery::new("gatsby").with_scopes(&[SearchScope::Books]))
        .await
        .unwrap();

    assert_eq!(results.total_count, 1);
    let hit = &results.results[0];
    assert_eq!(hit.result_type, ResultType::Book);
    assert!(hit.relevance_score > 0.0);
    assert!(hit.snippet.as_deref().unwrap().contains("Gatsby"));
    assert_eq!(hit.subtitle.as_deref(), Some("F. Scott Fitzgerald"));
}

#[tokio::test]
async fn test_books_and_notes_facets() {
    let book = Book::new("Piranesi", Some("Susanna Clarke"));
    let store = InMemoryStore::new()
        .with_note(Note::new(book.id, "Piranesi keeps a journal of the tides."))
        .with_quote(Quote::new(book.id, "Piranesi would not say so."))
        .with_book(book)
        .with_book(Book::new("Unrelated", None));

    let results = manager(store)
        .search(
            &SearchQuery::new("piranesi")
                .with_scopes(&[SearchScope::Books, SearchScope::Notes]),
        )
        .await
        .unwrap();
    assert_eq!(results.total_count, 2);
    assert_eq!(results.facets.type_count(ResultType::Book), 1);
    assert_eq!(results.facets.type_count(ResultType::Note), 1);
    assert_eq!(results.facets.type_count(ResultType::Quote), 0);
}

#[tokio::test]
async fn test_searched_scope_without_hits_reports_zero() {
    let store = InMemoryStore::new().with_book(gatsby());
    let results = manager(store)
        .search(
            &SearchQuery::new("gatsby")
                .with_scopes(&[SearchScope::Books, SearchScope::Notes]),
        )
        .await
        .unwrap();

    assert_eq!(results.facets.result_type.get("book"), Some(&1));
    assert_eq!(results.facets.result_type.get("note"), Some(&0));
    assert!(!results.facets.result_type.contains_key("quote"));
}

#[tokio::test]
async fn test_all_scope_spans_every_kind() {
    let results = manager(library())
        .search(&SearchQuery::new("nick"))
        .await
        .unwrap();
    let kinds: Vec<ResultType> = results.results.iter().map(|h| h.result_type).collect();
    assert!(kinds.contains(&ResultType::Note));
    assert!(kinds.contains(&ResultType::Quote));
    let quote = results
        .results
        .iter()
        .find(|h| h.result_type == ResultType::Quote)
        .unwrap();
    assert_eq!(quote.subtitle.as_deref(), Some("The Great Gatsby"));
}

#[tokio::test]
async fn test_unknown_scope_contributes_nothing() {
    let scopes: Vec<SearchScope> = ["books", "shelves"]
        .iter()
        .filter_map(|name| SearchScope::parse_lenient(name))
        .collect();
    let results = manager(library())
        .search(&SearchQuery::new("").with_scopes(&scopes))
        .await
        .unwrap();
    assert_eq!(results.total_count, 3);
    assert!(results
        .results
        .iter()
        .all(|h| h.result_type == ResultType::Book));
}

#[tokio::test]
async fn test_empty_query_matches_all_with_zero_score() {
    let results = manager(library())
        .search(&SearchQuery::new("").with_scopes(&[SearchScope::Books]))
        .await
        .unwrap();
    assert_eq!(results.total_count, 3);
    assert!(results.results.iter().all(|h| h.relevance_score == 0.0));
}

#[tokio::test]
async fn test_pagination_invariants() {
    let store =
        InMemoryStore::new().with_books((0..7).map(|i| Book::new(format!("Book {i}"), None)));
    let mgr = manager(store);

    for offset in [0, 3, 6, 7, 12] {
        for limit in [1, 3, 10] {
            let results = mgr
                .search(
                    &SearchQuery::new("book")
                        .with_scopes(&[SearchScope::Books])
                        .with_limit(limit)
                        .with_offset(offset),
                )
                .await
                .unwrap();
            let returned = results.results.len();
            assert_eq!(results.total_count, 7);
            assert!(returned <= limit);
            assert_eq!(returned, limit.min(7usize.saturating_sub(offset)));
            assert_eq!(results.has_more, offset + returned < 7);
        }
    }
}

#[tokio::test]
async fn test_title_ascending_order() {
    let results = manager(library())
        .search(
            &SearchQuery::new("")
                .with_scopes(&[SearchScope::Books])
                .with_sort(SortBy::Title, SortOrder::Asc),
        )
        .await
        .unwrap();
    let titles: Vec<&str> = results.results.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Brave New World", "The Dispossessed", "The Great Gatsby"]
    );
}

#[tokio::test]
async fn test_date_sort_with_undated_authors() {
    let old = Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap();
    let store = InMemoryStore::new()
        .with_book(Book::new("Older", Some("Ann Leckie")).with_created_at(old))
        .with_book(
            Book::new("Newer", Some("Ann Leckie")).with_created_at(old + Duration::days(30)),
        );
    let mgr = manager(store);
    let query = SearchQuery::new("").with_scopes(&[SearchScope::Books, SearchScope::Authors]);

    let asc = mgr
        .search(&query.clone().with_sort(SortBy::Date, SortOrder::Asc))
        .await
        .unwrap();
    let titles: Vec<&str> = asc.results.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Ann Leckie", "Older", "Newer"]);

    let desc = mgr
        .search(&query.with_sort(SortBy::Date, SortOrder::Desc))
        .await
        .unwrap();
    let titles: Vec<&str> = desc.results.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Newer", "Older", "Ann Leckie"]);
}

#[tokio::test]
async fn test_structured_filters_scope_to_their_kinds() {
    let filters = SearchFilters {
        book_status: Some(BookStatus::Reading),
        favorites_only: true,
        ..SearchFilters::default()
    };
    let results = manager(library())
        .search(
            &SearchQuery::new("")
                .with_scopes(&[SearchScope::Books, SearchScope::Notes])
                .with_filters(filters),
        )
        .await
        .unwrap();
    assert_eq!(results.facets.type_count(ResultType::Book), 1);
    assert_eq!(results.facets.type_count(ResultType::Note), 1);
    assert_eq!(results.facets.status.get("reading"), Some(&1));
}

#[tokio::test]
async fn test_relevance_scores_stay_in_range() {
    for q in ["the", "the great gatsby", "SCIENCE fiction", "a a a a", "zzz"] {
        let results = manager(library())
            .search(&SearchQuery::new(q))
            .await
            .unwrap();
        for hit in &results.results {
            assert!(
                (0.0..=1.0).contains(&hit.relevance_score),
                "{q}: {} scored {}",
                hit.title,
                hit.relevance_score
            );
        }
    }
}

#[tokio::test]
async fn test_validation_errors() {
    let mgr = manager(library());

    let long = SearchQuery::new("x".repeat(501));
    assert!(matches!(mgr.search(&long).await, Err(Error::InvalidInput(_))));

    let filters = SearchFilters {
        min_rating: Some(-1.0),
        ..SearchFilters::default()
    };
    let bad_rating = SearchQuery::new("x").with_filters(filters);
    assert!(matches!(mgr.search(&bad_rating).await, Err(Error::InvalidInput(_))));

    let bad_limit = AdvancedSearchQuery::new().title("x").with_limit(201);
    assert!(matches!(
        mgr.advanced_search(&bad_limit).await,
        Err(Error::InvalidInput(_))
    ));

    assert!(matches!(
        mgr.suggestions("x", 0).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_advanced_must_exclude_dystopian() {
    let results = manager(library())
        .advanced_search(
            &AdvancedSearchQuery::new()
                .with_scopes(&[SearchScope::Books])
                .should_include("society")
                .must_exclude("DYSTOPIAN"),
        )
        .await
        .unwrap();
    let titles: Vec<&str> = results.results.iter().map(|h| h.title.as_str()).collect();
    assert!(!titles.contains(&"Brave New World"));
    assert_eq!(results.total_count, 2);
    assert_eq!(results.query, "(society) -(DYSTOPIAN)");
}

#[tokio::test]
async fn test_advanced_field_targets_and_scoring() {
    let results = manager(library())
        .advanced_search(
            &AdvancedSearchQuery::new()
                .genre("science")
                .must_include("world")
                .should_include("utopia")
                .should_include("twin"),
        )
        .await
        .unwrap();

    assert_eq!(results.total_count, 2);
    assert_eq!(results.results[0].title, "The Dispossessed");
    assert!((results.results[0].relevance_score - 0.7).abs() < 1e-9);
    assert!((results.results[1].relevance_score - 0.5).abs() < 1e-9);
    assert_eq!(results.facets.type_count(ResultType::Book), 2);
    assert_eq!(results.query, "+(world) (utopia twin)");
}

#[tokio::test]
async fn test_advanced_limit_and_has_more() {
    let store =
        InMemoryStore::new().with_books((0..5).map(|i| Book::new(format!("Saga {i}"), None)));
    let results = manager(store)
        .advanced_search(&AdvancedSearchQuery::new().title("saga").with_limit(2))
        .await
        .unwrap();
    assert_eq!(results.total_count, 5);
    assert_eq!(results.results.len(), 2);
    assert!(results.has_more);
}

#[tokio::test]
async fn test_suggestions_prefer_prefix_then_count() {
    let store = InMemoryStore::new().with_books([
        Book::new("Legends of the Fall", Some("Jim Harrison")),
        Book::new("The Left Hand of Darkness", Some("Ursula K. Le Guin")),
        Book::new("The Lathe of Heaven", Some("Ursula K. Le Guin")),
        Book::new("Le Morte d'Arthur", Some("Thomas Malory")),
    ]);
    let suggestions = manager(store).suggestions("le", 10).await.unwrap();
    let texts: Vec<&str> = suggestions
        .suggestions
        .iter()
        .map(|s| s.text.as_str())
        .collect();

    // Prefix matches first (shorter first at equal count), then the rest.
    assert_eq!(texts[0], "Le Morte d'Arthur");
    assert_eq!(texts[1], "Legends of the Fall");
    let le_guin = suggestions
        .suggestions
        .iter()
        .position(|s| s.result_type == ResultType::Author)
        .unwrap();
    assert_eq!(texts[le_guin], "Ursula K. Le Guin");
    assert_eq!(suggestions.suggestions[le_guin].count, 2);
    assert!(texts.len() <= 10);

    let store =
        InMemoryStore::new().with_books((0..20).map(|i| Book::new(format!("Le {i}"), None)));
    let capped = manager(store).suggestions("le", 5).await.unwrap();
    assert_eq!(capped.suggestions.len(), 5);
}
