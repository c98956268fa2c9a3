use std::sync::Arc;

use booktrack_search::{
    AdvancedSearchQuery, Book, BookRepository, BookStatus, CollectionRepository,
    CreateCollectionRequest, Database, FilterPredicate, FilterSet, Note, Quote, ResultType,
    Review, SearchManager, SearchQuery, SearchScope,
};

async fn setup() -> (Database, SearchManager) {
    let db = Database::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let manager = SearchManager::new(Arc::new(db.clone()));
    (db, manager)
}

async fn seed(db: &Database) -> Book {
    let book = Book::new("The Left Hand of Darkness", Some("Ursula K. Le Guin"))
        .with_status(BookStatus::Completed)
        .with_rating(5)
        .with_genres(&["Science Fiction"])
        .with_description("An envoy on the winter planet Gethen.");
    db.books.insert(&book).await.unwrap();
    db.books
        .insert(
            &Book::new("The Dispossessed", Some("Ursula K. Le Guin"))
                .with_status(BookStatus::Reading)
                .with_description("A physicist travels between twin planets."),
        )
        .await
        .unwrap();

    db.notes
        .insert(&Note::new(book.id, "Gethen has no fixed sexes.").with_title("Gethen"))
        .await
        .unwrap();
    db.quotes
        .insert(
            &Quote::new(book.id, "Light is the left hand of darkness.").with_speaker("Genly Ai"),
        )
        .await
        .unwrap();
    db.reviews
        .insert(
            &Review::new(book.id)
                .with_rating(4.5)
                .with_title("Winter reading")
                .with_content("Gethen felt cold and alive."),
        )
        .await
        .unwrap();

    let list = db
        .lists
        .create("Hainish cycle", Some("Planets of the Ekumen"))
        .await
        .unwrap();
    db.lists.add_book(list, book.id).await.unwrap();
    let tag = db
        .tags
        .create("planetary", Some("#336699"), None)
        .await
        .unwrap();
    db.tags.tag_book(book.id, tag).await.unwrap();

    book
}

#[tokio::test]
async fn test_search_all_scopes_against_sqlite() {
    let (db, manager) = setup().await;
    seed(&db).await;

    let results = manager.search(&SearchQuery::new("gethen")).await.unwrap();
    assert_eq!(results.facets.type_count(ResultType::Book), 1);
    assert_eq!(results.facets.type_count(ResultType::Note), 1);
    assert_eq!(results.facets.type_count(ResultType::Review), 1);
    assert_eq!(results.total_count, 3);

    let note = results
        .results
        .iter()
        .find(|h| h.result_type == ResultType::Note)
        .unwrap();
    assert_eq!(note.title, "Gethen");
    assert_eq!(note.subtitle.as_deref(), Some("The Left Hand of Darkness"));
}

#[tokio::test]
async fn test_lists_tags_and_authors_hits() {
    let (db, manager) = setup().await;
    seed(&db).await;

    let results = manager
        .search(&SearchQuery::new("planet").with_scopes(&[
            SearchScope::Lists,
            SearchScope::Tags,
        ]))
        .await
        .unwrap();
    assert_eq!(results.total_count, 2);
    assert!(results
        .results
        .iter()
        .all(|h| h.subtitle.as_deref() == Some("1 books")));

    let results = manager
        .search(&SearchQuery::new("le guin").with_scopes(&[SearchScope::Authors]))
        .await
        .unwrap();
    assert_eq!(results.total_count, 1);
    assert_eq!(results.results[0].id, "Ursula K. Le Guin");
    assert_eq!(results.results[0].subtitle.as_deref(), Some("2 books"));
}

#[tokio::test]
async fn test_smart_collection_hits_report_live_counts() {
    let (db, manager) = setup().await;
    seed(&db).await;
    db.collections
        .create(
            CreateCollectionRequest::smart(
                "Top rated",
                FilterSet::new().with(FilterPredicate::rating_gte(5)),
            )
            .with_description("Five star reads"),
        )
        .await
        .unwrap();

    let results = manager
        .search(&SearchQuery::new("five star").with_scopes(&[SearchScope::Collections]))
        .await
        .unwrap();
    assert_eq!(results.total_count, 1);
    assert_eq!(results.results[0].metadata["book_count"], 1);
}

#[tokio::test]
async fn test_entity_searches_against_sqlite() {
    let (db, manager) = setup().await;
    let book = seed(&db).await;

    let books = manager
        .search_books("planet", Some(BookStatus::Reading), None, None, 20)
        .await
        .unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "The Dispossessed");

    let notes = manager
        .search_notes("sexes", Some(book.id), None, 20)
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].book_title.as_deref(), Some("The Left Hand of Darkness"));

    let quotes = manager
        .search_quotes("darkness", None, Some("genly"), 20)
        .await
        .unwrap();
    assert_eq!(quotes.len(), 1);

    let reviews = manager
        .search_reviews("cold", None, Some(5.0), 20)
        .await
        .unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_advanced_search_against_sqlite() {
    let (db, manager) = setup().await;
    seed(&db).await;

    let results = manager
        .advanced_search(
            &AdvancedSearchQuery::new()
                .author("le guin")
                .must_include("planet")
                .must_exclude("physicist"),
        )
        .await
        .unwrap();
    assert_eq!(results.total_count, 1);
    assert_eq!(results.results[0].title, "The Left Hand of Darkness");
    assert_eq!(results.query, "author:le guin +(planet) -(physicist)");
}

#[tokio::test]
async fn test_suggestions_against_sqlite() {
    let (db, manager) = setup().await;
    seed(&db).await;

    let suggestions = manager.suggestions("the", 10).await.unwrap();
    let texts: Vec<&str> = suggestions
        .suggestions
        .iter()
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(texts, vec!["The Dispossessed", "The Left Hand of Darkness"]);
}
