//! Collection repository implementation.
//!
//! Manual collections store membership rows ordered by position. Smart
//! collections store a [`FilterSet`] as JSON and select their books by
//! evaluating it against the whole library on every read.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use booktrack_core::{
    new_v7, Book, BookRepository, Collection, CollectionBook, CollectionBookUpdate,
    CollectionRepository, CollectionType, CreateCollectionRequest, Error, FilterPredicate,
    FilterSet, Result, StoreConditions, UpdateCollectionRequest,
};

use crate::books::{book_from_row, SqliteBookRepository};

const COLLECTION_COLUMNS: &str = "id, name, description, collection_type, smart_criteria, \
     icon, color, sort_order, is_default, is_pinned, created_at";

/// The built-in smart collections for a given calendar year.
pub fn default_collection_requests(year: i32) -> Vec<CreateCollectionRequest> {
    vec![
        CreateCollectionRequest::smart(
            "Favorites",
            FilterSet::new().with(FilterPredicate::rating_gte(5)),
        )
        .with_description("Books rated 5 stars")
        .with_icon("star")
        .with_color("gold"),
        CreateCollectionRequest::smart(
            "Currently Reading",
            FilterSet::new().with(FilterPredicate::status_is("reading")),
        )
        .with_description("Books you're reading now")
        .with_icon("book-open")
        .with_color("blue"),
        CreateCollectionRequest::smart(
            "To Read",
            FilterSet::new().with(FilterPredicate::status_is("wishlist")),
        )
        .with_description("Your reading wishlist")
        .with_icon("list")
        .with_color("green"),
        CreateCollectionRequest::smart(
            "Completed This Year",
            FilterSet::new()
                .with(FilterPredicate::status_is("completed"))
                .with(FilterPredicate::finished_in_year(year)),
        )
        .with_description("Books finished this year")
        .with_icon("check")
        .with_color("purple"),
    ]
}

/// SQLite implementation of CollectionRepository.
#[derive(Clone)]
pub struct SqliteCollectionRepository {
    pool: SqlitePool,
    books: SqliteBookRepository,
}

impl SqliteCollectionRepository {
    /// Create a new SqliteCollectionRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            books: SqliteBookRepository::new(pool.clone()),
            pool,
        }
    }

    fn collection_from_row(r: &SqliteRow) -> Result<Collection> {
        let collection_type: String = r.get("collection_type");
        let smart_criteria: Option<String> = r.get("smart_criteria");
        Ok(Collection {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
            collection_type: collection_type.parse()?,
            smart_criteria: smart_criteria
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            icon: r.get("icon"),
            color: r.get("color"),
            sort_order: r.get("sort_order"),
            is_default: r.get("is_default"),
            is_pinned: r.get("is_pinned"),
            book_count: 0,
            created_at: r.get("created_at"),
        })
    }

    async fn manual_book_count(&self, id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM collection_books WHERE collection_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    /// Decode rows and fill in book counts. The library is loaded at most
    /// once, and only when a smart collection is present.
    async fn hydrate(&self, rows: &[SqliteRow]) -> Result<Vec<Collection>> {
        let mut collections = rows
            .iter()
            .map(Self::collection_from_row)
            .collect::<Result<Vec<_>>>()?;

        let mut library: Option<Vec<Book>> = None;
        for collection in &mut collections {
            let kind = (&collection.collection_type, &collection.smart_criteria);
            collection.book_count = match kind {
                (CollectionType::Manual, _) => self.manual_book_count(collection.id).await?,
                (CollectionType::Smart, None) => 0,
                (CollectionType::Smart, Some(criteria)) => {
                    if library.is_none() {
                        library = Some(self.books.list(&StoreConditions::default()).await?);
                    }
                    let books = library.as_deref().unwrap_or_default();
                    criteria.count(books) as i64
                }
            };
        }
        Ok(collections)
    }

    async fn require(&self, id: Uuid) -> Result<Collection> {
        self.get(id).await?.ok_or(Error::CollectionNotFound(id))
    }

    async fn membership(
        &self,
        collection_id: Uuid,
        book_id: Uuid,
    ) -> Result<Option<CollectionBook>> {
        let row = sqlx::query(
            "SELECT collection_id, book_id, position, notes, added_at
             FROM collection_books WHERE collection_id = ? AND book_id = ?",
        )
        .bind(collection_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| CollectionBook {
            collection_id: r.get("collection_id"),
            book_id: r.get("book_id"),
            position: r.get("position"),
            notes: r.get("notes"),
            added_at: r.get("added_at"),
        }))
    }
}

#[async_trait]
impl CollectionRepository for SqliteCollectionRepository {
    async fn create(&self, req: CreateCollectionRequest) -> Result<Uuid> {
        if req.collection_type == CollectionType::Manual && req.smart_criteria.is_some() {
            return Err(Error::InvalidInput(
                "manual collections cannot carry smart criteria".to_string(),
            ));
        }

        let id = new_v7();
        let now = Utc::now();
        let criteria = req
            .smart_criteria
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "INSERT INTO collections (id, name, description, collection_type, smart_criteria,
                icon, color, sort_order, is_default, is_pinned, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM collections),
                ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.collection_type.as_str())
        .bind(criteria)
        .bind(&req.icon)
        .bind(&req.color)
        .bind(req.is_default)
        .bind(req.is_pinned)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "collections",
            op = "create",
            collection_id = %id,
            collection_type = req.collection_type.as_str(),
            "Collection created"
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Collection>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = ?"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(self.hydrate(&rows).await?.into_iter().next())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Collection>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE name = ?"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(self.hydrate(&rows).await?.into_iter().next())
    }

    async fn list(
        &self,
        collection_type: Option<CollectionType>,
        pinned_only: bool,
    ) -> Result<Vec<Collection>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE 1 = 1"
        ));
        if let Some(kind) = collection_type {
            qb.push(" AND collection_type = ").push_bind(kind.as_str());
        }
        if pinned_only {
            qb.push(" AND is_pinned = 1");
        }
        qb.push(" ORDER BY is_pinned DESC, sort_order, name COLLATE NOCASE");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.hydrate(&rows).await
    }

    async fn update(&self, id: Uuid, req: &UpdateCollectionRequest) -> Result<Collection> {
        let current = self.require(id).await?;
        if req.smart_criteria.is_some() && current.collection_type != CollectionType::Smart {
            return Err(Error::InvalidInput(format!(
                "collection {} is not a smart collection",
                current.name
            )));
        }
        let criteria = req
            .smart_criteria
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "UPDATE collections SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                icon = COALESCE(?, icon),
                color = COALESCE(?, color),
                sort_order = COALESCE(?, sort_order),
                is_pinned = COALESCE(?, is_pinned),
                smart_criteria = COALESCE(?, smart_criteria),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.icon)
        .bind(&req.color)
        .bind(req.sort_order)
        .bind(req.is_pinned)
        .bind(criteria)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "collections",
            op = "update",
            collection_id = %id,
            "Collection updated"
        );
        self.require(id).await
    }

    async fn update_criteria(&self, id: Uuid, criteria: &FilterSet) -> Result<()> {
        let collection = self.require(id).await?;
        if collection.collection_type != CollectionType::Smart {
            return Err(Error::InvalidInput(format!(
                "collection {} is not a smart collection",
                collection.name
            )));
        }

        sqlx::query("UPDATE collections SET smart_criteria = ?, updated_at = ? WHERE id = ?")
            .bind(serde_json::to_string(criteria)?)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let collection = self.require(id).await?;
        if collection.is_default {
            return Err(Error::InvalidInput(format!(
                "cannot delete default collection {}",
                collection.name
            )));
        }

        sqlx::query("DELETE FROM collections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn add_book(
        &self,
        collection_id: Uuid,
        book_id: Uuid,
        notes: Option<&str>,
    ) -> Result<()> {
        let collection = self.require(collection_id).await?;
        if collection.collection_type == CollectionType::Smart {
            return Err(Error::InvalidInput(format!(
                "books cannot be added to smart collection {}",
                collection.name
            )));
        }

        let inserted = sqlx::query(
            "INSERT INTO collection_books (collection_id, book_id, position, added_at, notes)
             VALUES (?, ?,
                (SELECT COALESCE(MAX(position) + 1, 0)
                 FROM collection_books WHERE collection_id = ?),
                ?, ?)
             ON CONFLICT (collection_id, book_id) DO NOTHING",
        )
        .bind(collection_id)
        .bind(book_id)
        .bind(collection_id)
        .bind(Utc::now())
        .bind(notes)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if inserted.rows_affected() == 0 {
            return Err(Error::InvalidInput(format!(
                "book {book_id} is already in collection {}",
                collection.name
            )));
        }
        Ok(())
    }

    async fn update_book(
        &self,
        collection_id: Uuid,
        book_id: Uuid,
        update: &CollectionBookUpdate,
    ) -> Result<Option<CollectionBook>> {
        let changed = sqlx::query(
            "UPDATE collection_books SET
                position = COALESCE(?, position),
                notes = COALESCE(?, notes)
             WHERE collection_id = ? AND book_id = ?",
        )
        .bind(update.position)
        .bind(&update.notes)
        .bind(collection_id)
        .bind(book_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if changed.rows_affected() == 0 {
            return Ok(None);
        }
        self.membership(collection_id, book_id).await
    }

    async fn remove_book(&self, collection_id: Uuid, book_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM collection_books WHERE collection_id = ? AND book_id = ?")
            .bind(collection_id)
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn reorder_books(&self, collection_id: Uuid, book_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for (position, book_id) in book_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE collection_books SET position = ? WHERE collection_id = ? AND book_id = ?",
            )
            .bind(position as i64)
            .bind(collection_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn get_books(&self, id: Uuid, limit: usize, offset: usize) -> Result<Vec<Book>> {
        let Some(collection) = self.get(id).await? else {
            return Ok(Vec::new());
        };

        let books = match (collection.collection_type, collection.smart_criteria) {
            (CollectionType::Manual, _) => {
                let rows = sqlx::query(
                    "SELECT b.* FROM books b
                     JOIN collection_books cb ON cb.book_id = b.id
                     WHERE cb.collection_id = ?
                     ORDER BY cb.position, cb.added_at
                     LIMIT ? OFFSET ?",
                )
                .bind(id)
                .bind(i64::try_from(limit).unwrap_or(i64::MAX))
                .bind(i64::try_from(offset).unwrap_or(i64::MAX))
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;

                rows.iter().map(book_from_row).collect::<Result<Vec<_>>>()?
            }
            (CollectionType::Smart, None) => Vec::new(),
            (CollectionType::Smart, Some(criteria)) => {
                let library = self.books.list(&StoreConditions::default()).await?;
                criteria.apply(library, limit, offset)
            }
        };

        debug!(
            subsystem = "database",
            component = "collections",
            op = "get_books",
            collection_id = %id,
            result_count = books.len(),
            "Collection books loaded"
        );
        Ok(books)
    }

    async fn book_count(&self, id: Uuid) -> Result<i64> {
        Ok(self.get(id).await?.map_or(0, |c| c.book_count))
    }

    async fn collections_for_book(&self, book_id: Uuid) -> Result<Vec<Collection>> {
        let rows = sqlx::query(
            "SELECT c.id, c.name, c.description, c.collection_type, c.smart_criteria, c.icon,
                    c.color, c.sort_order, c.is_default, c.is_pinned, c.created_at
             FROM collections c
             JOIN collection_books cb ON cb.collection_id = c.id
             WHERE cb.book_id = ?
             ORDER BY c.name COLLATE NOCASE",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.hydrate(&rows).await
    }

    async fn create_default_collections(&self) -> Result<Vec<Collection>> {
        let mut created = Vec::new();
        for req in default_collection_requests(Utc::now().year()) {
            if self.get_by_name(&req.name).await?.is_some() {
                continue;
            }
            let mut req = req.as_default();
            req.is_pinned = true;
            let id = self.create(req).await?;
            created.push(self.require(id).await?);
        }

        info!(
            subsystem = "database",
            component = "collections",
            op = "create_defaults",
            result_count = created.len(),
            "Default collections ensured"
        );
        Ok(created)
    }
}
