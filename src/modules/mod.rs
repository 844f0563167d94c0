pub mod authors;
pub mod books;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod query;

use std::sync::Arc;

use bookstore_cache::{CacheStoreArc, MemoryCache};
use bookstore_db::{MemoryRepository, RepositoryArc};
use bookstore_kernel::{settings::CacheSettings, ModuleRegistry};

use self::authors::{models::Author, service::AuthorService, AuthorsModule};
use self::books::{models::Book, service::BookService, BooksModule};

/// The catalog services, wired to their gateways.
#[derive(Clone)]
pub struct Catalog {
    pub authors: Arc<AuthorService>,
    pub books: Arc<BookService>,
}

impl Catalog {
    pub fn new(
        author_store: RepositoryArc<Author>,
        book_store: RepositoryArc<Book>,
        cache: CacheStoreArc,
        settings: &CacheSettings,
    ) -> Self {
        Self {
            authors: Arc::new(AuthorService::new(author_store.clone())),
            books: Arc::new(BookService::new(
                book_store,
                author_store,
                cache,
                settings.ttl(),
            )),
        }
    }

    /// Catalog backed by in-process stores.
    pub fn in_memory(settings: &CacheSettings) -> Self {
        Self::new(
            Arc::new(MemoryRepository::<Author>::new()),
            Arc::new(MemoryRepository::<Book>::new()),
            Arc::new(MemoryCache::with_capacity(settings.max_entries)),
            settings,
        )
    }
}

/// Register all catalog modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, catalog: &Catalog) -> anyhow::Result<()> {
    registry.register(Arc::new(AuthorsModule::new(catalog.authors.clone())))?;
    registry.register(Arc::new(BooksModule::new(catalog.books.clone())))?;
    Ok(())
}
