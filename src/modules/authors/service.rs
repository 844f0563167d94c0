use bookstore_db::{Filter, FindMany, RepositoryArc};

use super::models::{Author, AuthorListOptions, CreateAuthor, UpdateAuthor};
use crate::modules::error::{ServiceError, ServiceResult};
use crate::modules::query::Page;

/// Author CRUD and listing. Reads always go to the repository.
pub struct AuthorService {
    authors: RepositoryArc<Author>,
}

impl AuthorService {
    pub fn new(authors: RepositoryArc<Author>) -> Self {
        Self { authors }
    }

    pub async fn create(&self, input: CreateAuthor) -> ServiceResult<Author> {
        input.validate()?;
        let author = self.authors.create(input).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn list(&self, options: &AuthorListOptions) -> ServiceResult<Page<Author>> {
        let filter = options.filter();
        let query = FindMany {
            filter: filter.clone(),
            order_by: options.sort.order_by(),
            skip: options.pagination.skip(),
            take: options.pagination.take(),
        };

        let data = self.authors.find_many(&query).await?;
        let total = self.authors.count(&filter).await?;

        Ok(Page {
            data,
            total,
            page: options.pagination.page,
            limit: options.pagination.limit,
        })
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Author> {
        self.authors
            .find_first(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ServiceError::not_found("author", id))
    }

    pub async fn update(&self, id: i64, patch: UpdateAuthor) -> ServiceResult<Author> {
        patch.validate()?;
        let author = self
            .authors
            .update(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("author", id))?;
        tracing::info!(author_id = id, "author updated");
        Ok(author)
    }

    /// Removes the author only; books referencing it keep their `authorId`.
    pub async fn delete(&self, id: i64) -> ServiceResult<Author> {
        let author = self
            .authors
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("author", id))?;
        tracing::info!(author_id = id, "author deleted");
        Ok(author)
    }
}
