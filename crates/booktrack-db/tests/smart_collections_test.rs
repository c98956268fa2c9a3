use booktrack_db::{
    Book, BookRepository, BookStatus, CollectionBookUpdate, CollectionRepository, CollectionType,
    CreateCollectionRequest, Database, Error, FilterPredicate, FilterSet, MatchMode, SortOrder,
    UpdateCollectionRequest,
};
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

async fn setup_db() -> Database {
    Database::in_memory()
        .await
        .expect("Failed to create in-memory database")
}

async fn seed_library(db: &Database) -> Vec<Book> {
    let year = Utc::now().year();
    let books = vec![
        Book::new("The Dispossessed", Some("Ursula K. Le Guin"))
            .with_status(BookStatus::Completed)
            .with_rating(5)
            .with_genres(&["Science Fiction"])
            .with_tags(&["classic", "utopia"])
            .with_date_finished(NaiveDate::from_ymd_opt(year, 2, 14).unwrap()),
        Book::new("A Wizard of Earthsea", Some("Ursula K. Le Guin"))
            .with_status(BookStatus::Reading)
            .with_rating(4)
            .with_genres(&["Fantasy"])
            .with_tags(&["fantastical"]),
        Book::new("Neuromancer", Some("William Gibson"))
            .with_status(BookStatus::Completed)
            .with_rating(3)
            .with_date_finished(NaiveDate::from_ymd_opt(year - 1, 11, 2).unwrap()),
        Book::new("Piranesi", Some("Susanna Clarke")).with_status(BookStatus::Wishlist),
    ];
    for book in &books {
        db.books.insert(book).await.expect("insert book");
    }
    books
}

#[tokio::test]
async fn test_book_round_trip() {
    let db = setup_db().await;
    let books = seed_library(&db).await;

    let loaded = db.books.get(books[0].id).await.unwrap().unwrap();
    assert_eq!(loaded.title, "The Dispossessed");
    assert_eq!(loaded.status, BookStatus::Completed);
    assert_eq!(loaded.genres, vec!["Science Fiction".to_string()]);
    assert_eq!(loaded.tags, vec!["classic".to_string(), "utopia".to_string()]);
    assert_eq!(loaded.date_finished, books[0].date_finished);
}

#[tokio::test]
async fn test_update_missing_book_is_not_found() {
    let db = setup_db().await;
    let ghost = Book::new("Ghost", None);
    let err = db.books.update(&ghost).await.unwrap_err();
    assert!(matches!(err, Error::BookNotFound(id) if id == ghost.id));
}

#[tokio::test]
async fn test_authors_are_grouped() {
    let db = setup_db().await;
    seed_library(&db).await;

    let authors = db.books.authors().await.unwrap();
    let le_guin = authors
        .iter()
        .find(|a| a.name == "Ursula K. Le Guin")
        .expect("Le Guin present");
    assert_eq!(le_guin.book_count, 2);
    assert_eq!(authors.len(), 3);
}

#[tokio::test]
async fn test_smart_collection_rating_gte() {
    let db = setup_db().await;
    seed_library(&db).await;

    let id = db
        .collections
        .create(CreateCollectionRequest::smart(
            "Top Rated",
            FilterSet::new().with(FilterPredicate::rating_gte(4)),
        ))
        .await
        .unwrap();

    let books = db.collections.get_books(id, 50, 0).await.unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["A Wizard of Earthsea", "The Dispossessed"]);
    assert_eq!(db.collections.book_count(id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_smart_collection_sort_and_limit() {
    let db = setup_db().await;
    seed_library(&db).await;

    let criteria = FilterSet::new()
        .with(FilterPredicate::has_rating())
        .with_sort("rating", SortOrder::Desc)
        .with_limit(2);
    let id = db
        .collections
        .create(CreateCollectionRequest::smart("Best Two", criteria))
        .await
        .unwrap();

    let books = db.collections.get_books(id, 50, 0).await.unwrap();
    let ratings: Vec<Option<i64>> = books.iter().map(|b| b.rating).collect();
    assert_eq!(ratings, vec![Some(5), Some(4)]);

    let page = db.collections.get_books(id, 50, 1).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].rating, Some(4));
}

#[tokio::test]
async fn test_smart_collection_negated_tag_token() {
    let db = setup_db().await;
    seed_library(&db).await;

    let criteria = FilterSet::new().with(FilterPredicate::tag_has("fantasy").negated());
    let id = db
        .collections
        .create(CreateCollectionRequest::smart("Not Fantasy", criteria))
        .await
        .unwrap();

    // "fantastical" is not the token "fantasy", so every book qualifies.
    assert_eq!(db.collections.get_books(id, 50, 0).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_smart_collection_any_mode() {
    let db = setup_db().await;
    seed_library(&db).await;

    let criteria = FilterSet::new()
        .with_match_mode(MatchMode::Any)
        .with(FilterPredicate::status_is("wishlist"))
        .with(FilterPredicate::author_contains("gibson"));
    let id = db
        .collections
        .create(CreateCollectionRequest::smart("Mixed", criteria))
        .await
        .unwrap();

    let books = db.collections.get_books(id, 50, 0).await.unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Neuromancer", "Piranesi"]);
}

#[tokio::test]
async fn test_criteria_survive_storage_with_unknown_operator() {
    let db = setup_db().await;
    seed_library(&db).await;

    let criteria = FilterSet::new()
        .with(FilterPredicate::new("rating", "approximately", 4))
        .with_match_mode(MatchMode::Any);
    let id = db
        .collections
        .create(CreateCollectionRequest::smart("Odd", criteria.clone()))
        .await
        .unwrap();

    let stored = db.collections.get(id).await.unwrap().unwrap();
    assert_eq!(stored.smart_criteria, Some(criteria));
    assert!(db.collections.get_books(id, 50, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_criteria() {
    let db = setup_db().await;
    seed_library(&db).await;

    let id = db
        .collections
        .create(CreateCollectionRequest::smart(
            "Status",
            FilterSet::new().with(FilterPredicate::status_is("reading")),
        ))
        .await
        .unwrap();
    assert_eq!(db.collections.book_count(id).await.unwrap(), 1);

    db.collections
        .update_criteria(
            id,
            &FilterSet::new().with(FilterPredicate::status_in(&["reading", "completed"])),
        )
        .await
        .unwrap();
    assert_eq!(db.collections.book_count(id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_manual_collection_positions() {
    let db = setup_db().await;
    let books = seed_library(&db).await;

    let id = db
        .collections
        .create(CreateCollectionRequest::manual("Shelf"))
        .await
        .unwrap();
    for book in books.iter().take(3) {
        db.collections.add_book(id, book.id, None).await.unwrap();
    }
    let err = db.collections.add_book(id, books[0].id, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(db.collections.book_count(id).await.unwrap(), 3);

    db.collections
        .reorder_books(id, &[books[2].id, books[0].id, books[1].id])
        .await
        .unwrap();
    let ordered = db.collections.get_books(id, 10, 0).await.unwrap();
    let ids: Vec<Uuid> = ordered.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![books[2].id, books[0].id, books[1].id]);

    let paged = db.collections.get_books(id, 1, 1).await.unwrap();
    assert_eq!(paged[0].id, books[0].id);

    db.collections.remove_book(id, books[0].id).await.unwrap();
    assert_eq!(db.collections.book_count(id).await.unwrap(), 2);

    let memberships = db.collections.collections_for_book(books[1].id).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].collection_type, CollectionType::Manual);
}

#[tokio::test]
async fn test_add_book_to_smart_collection_is_rejected() {
    let db = setup_db().await;
    let books = seed_library(&db).await;
    let id = db
        .collections
        .create(CreateCollectionRequest::smart("Smart", FilterSet::new()))
        .await
        .unwrap();

    let err = db.collections.add_book(id, books[0].id, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = db
        .collections
        .add_book(Uuid::nil(), books[0].id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CollectionNotFound(_)));
}

#[tokio::test]
async fn test_unknown_collection_yields_no_books() {
    let db = setup_db().await;
    seed_library(&db).await;
    assert!(db
        .collections
        .get_books(Uuid::nil(), 10, 0)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(db.collections.book_count(Uuid::nil()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_default_collections_are_idempotent() {
    let db = setup_db().await;
    seed_library(&db).await;

    let created = db.collections.create_default_collections().await.unwrap();
    assert_eq!(created.len(), 4);
    assert!(created.iter().all(|c| c.is_default && c.is_pinned));

    let again = db.collections.create_default_collections().await.unwrap();
    assert!(again.is_empty());
    assert_eq!(db.collections.list(None, false).await.unwrap().len(), 4);

    let favorites = db.collections.get_by_name("Favorites").await.unwrap().unwrap();
    assert_eq!(favorites.icon.as_deref(), Some("star"));
    assert_eq!(favorites.book_count, 1);

    let completed = db
        .collections
        .get_by_name("Completed This Year")
        .await
        .unwrap()
        .unwrap();
    let books = db.collections.get_books(completed.id, 50, 0).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "The Dispossessed");
}

#[tokio::test]
async fn test_delete_collection_keeps_books() {
    let db = setup_db().await;
    let books = seed_library(&db).await;
    let id = db
        .collections
        .create(CreateCollectionRequest::manual("Temp"))
        .await
        .unwrap();
    db.collections.add_book(id, books[0].id, None).await.unwrap();

    db.collections.delete(id).await.unwrap();
    assert!(db.collections.get(id).await.unwrap().is_none());
    assert!(db.books.get(books[0].id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_default_collection_cannot_be_deleted() {
    let db = setup_db().await;
    db.collections.create_default_collections().await.unwrap();
    let favorites = db.collections.get_by_name("Favorites").await.unwrap().unwrap();

    let err = db.collections.delete(favorites.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(db.collections.get(favorites.id).await.unwrap().is_some());

    let err = db.collections.delete(Uuid::nil()).await.unwrap_err();
    assert!(matches!(err, Error::CollectionNotFound(_)));
}

#[tokio::test]
async fn test_list_filters_by_type_and_pin() {
    let db = setup_db().await;
    db.collections.create_default_collections().await.unwrap();
    db.collections
        .create(CreateCollectionRequest::manual("Shelf"))
        .await
        .unwrap();

    let all = db.collections.list(None, false).await.unwrap();
    assert_eq!(all.len(), 5);

    let manual = db
        .collections
        .list(Some(CollectionType::Manual), false)
        .await
        .unwrap();
    assert_eq!(manual.len(), 1);
    assert_eq!(manual[0].name, "Shelf");

    let pinned = db.collections.list(None, true).await.unwrap();
    assert_eq!(pinned.len(), 4);
    assert!(pinned.iter().all(|c| c.is_pinned));

    let pinned_manual = db
        .collections
        .list(Some(CollectionType::Manual), true)
        .await
        .unwrap();
    assert!(pinned_manual.is_empty());
}

#[tokio::test]
async fn test_update_collection_fields() {
    let db = setup_db().await;
    seed_library(&db).await;
    let id = db
        .collections
        .create(CreateCollectionRequest::smart(
            "Status",
            FilterSet::new().with(FilterPredicate::status_is("reading")),
        ))
        .await
        .unwrap();

    let updated = db
        .collections
        .update(
            id,
            &UpdateCollectionRequest::new()
                .name("Finished")
                .color("#336699")
                .pinned(true)
                .criteria(FilterSet::new().with(FilterPredicate::status_is("completed"))),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Finished");
    assert_eq!(updated.color.as_deref(), Some("#336699"));
    assert!(updated.is_pinned);
    assert_eq!(updated.book_count, 2);

    // Unset fields stay as they were.
    let renamed = db
        .collections
        .update(id, &UpdateCollectionRequest::new().name("Done"))
        .await
        .unwrap();
    assert_eq!(renamed.color.as_deref(), Some("#336699"));
    assert_eq!(renamed.book_count, 2);
}

#[tokio::test]
async fn test_update_rejects_criteria_on_manual_collection() {
    let db = setup_db().await;
    let id = db
        .collections
        .create(CreateCollectionRequest::manual("Shelf"))
        .await
        .unwrap();

    let err = db
        .collections
        .update(id, &UpdateCollectionRequest::new().criteria(FilterSet::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = db
        .collections
        .update(Uuid::nil(), &UpdateCollectionRequest::new().name("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CollectionNotFound(_)));
}

#[tokio::test]
async fn test_update_book_in_collection() {
    let db = setup_db().await;
    let books = seed_library(&db).await;
    let id = db
        .collections
        .create(CreateCollectionRequest::manual("Shelf"))
        .await
        .unwrap();
    db.collections
        .add_book(id, books[0].id, Some("first pick"))
        .await
        .unwrap();
    db.collections.add_book(id, books[1].id, None).await.unwrap();

    let entry = db
        .collections
        .update_book(
            id,
            books[0].id,
            &CollectionBookUpdate {
                position: Some(5),
                notes: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.position, 5);
    assert_eq!(entry.notes.as_deref(), Some("first pick"));

    let ordered = db.collections.get_books(id, 10, 0).await.unwrap();
    assert_eq!(ordered[0].id, books[1].id);

    let entry = db
        .collections
        .update_book(
            id,
            books[1].id,
            &CollectionBookUpdate {
                notes: Some("reread".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.position, 1);
    assert_eq!(entry.notes.as_deref(), Some("reread"));

    let missing = db
        .collections
        .update_book(id, books[3].id, &CollectionBookUpdate::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}
