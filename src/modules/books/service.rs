use std::collections::BTreeMap;
use std::time::Duration;

use bookstore_cache::{CacheError, CacheStoreArc};
use bookstore_db::{Filter, FindMany, RepositoryArc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::{book_cache_key, Book, BookListOptions, BookWithAuthor, CreateBook, UpdateBook};
use crate::modules::authors::models::Author;
use crate::modules::error::{ServiceError, ServiceResult};
use crate::modules::query::Page;

/// Book CRUD and listing with a read-through cache.
///
/// `get` and `list` consult the cache first and populate it on a miss.
/// `create` seeds `book:<id>`; `update` and `delete` drop it. Listing
/// entries are left to expire on their own, so a listing may trail
/// mutations by up to one TTL.
pub struct BookService {
    books: RepositoryArc<Book>,
    authors: RepositoryArc<Author>,
    cache: CacheStoreArc,
    ttl: Duration,
}

impl BookService {
    pub fn new(
        books: RepositoryArc<Book>,
        authors: RepositoryArc<Author>,
        cache: CacheStoreArc,
        ttl: Duration,
    ) -> Self {
        Self {
            books,
            authors,
            cache,
            ttl,
        }
    }

    pub async fn create(&self, input: CreateBook) -> ServiceResult<Book> {
        input.validate()?;
        let book = self.books.create(input).await?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "book created");

        self.store(&book_cache_key(book.id), &book).await?;
        Ok(book)
    }

    pub async fn list(&self, options: &BookListOptions) -> ServiceResult<Page<BookWithAuthor>> {
        let cache_key = options.cache_key();
        if let Some(page) = self.cached(&cache_key).await? {
            return Ok(page);
        }

        let filter = options.filter();
        let query = FindMany {
            filter: filter.clone(),
            order_by: options.sort.order_by(),
            skip: options.pagination.skip(),
            take: options.pagination.take(),
        };

        let books = self.books.find_many(&query).await?;
        let total = self.books.count(&filter).await?;
        let data = self.attach_authors(books).await?;

        let page = Page {
            data,
            total,
            page: options.pagination.page,
            limit: options.pagination.limit,
        };

        self.store(&cache_key, &page).await?;
        Ok(page)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Book> {
        let cache_key = book_cache_key(id);
        if let Some(book) = self.cached(&cache_key).await? {
            return Ok(book);
        }

        let book = self
            .books
            .find_first(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("book", id))?;

        self.store(&cache_key, &book).await?;
        Ok(book)
    }

    pub async fn update(&self, id: i64, patch: UpdateBook) -> ServiceResult<Book> {
        patch.validate()?;
        let book = self
            .books
            .update(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("book", id))?;
        tracing::info!(book_id = id, "book updated");

        self.invalidate(&book_cache_key(id)).await?;
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<Book> {
        let book = self
            .books
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("book", id))?;
        tracing::info!(book_id = id, "book deleted");

        self.invalidate(&book_cache_key(id)).await?;
        Ok(book)
    }

    /// Looks up each distinct author once. Missing authors yield `None`.
    async fn attach_authors(&self, books: Vec<Book>) -> ServiceResult<Vec<BookWithAuthor>> {
        let mut authors: BTreeMap<i64, Option<Author>> = BTreeMap::new();
        for book in &books {
            if !authors.contains_key(&book.author_id) {
                let author = self
                    .authors
                    .find_first(&Filter::by_id(book.author_id))
                    .await?;
                authors.insert(book.author_id, author);
            }
        }

        Ok(books
            .into_iter()
            .map(|book| {
                let author = authors.get(&book.author_id).cloned().flatten();
                BookWithAuthor { book, author }
            })
            .collect())
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> ServiceResult<Option<T>> {
        let Some(value) = self.cache.get(key).await? else {
            tracing::debug!(cache_key = key, "cache miss");
            return Ok(None);
        };

        tracing::debug!(cache_key = key, "cache hit");
        let decoded = serde_json::from_value(value).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(decoded))
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) -> ServiceResult<()> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.cache.set(key, value, self.ttl).await?;
        tracing::debug!(cache_key = key, ttl_secs = self.ttl.as_secs(), "cache populated");
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> ServiceResult<()> {
        self.cache.delete(key).await?;
        tracing::debug!(cache_key = key, "cache entry invalidated");
        Ok(())
    }
}
