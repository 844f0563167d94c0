pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use self::service::BookService;
use super::openapi;

/// Books resource: CRUD plus filtered listing behind a read-through cache
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            cache_ttl_secs = ctx.settings.cache.ttl_secs,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_properties = json!({
            "id": { "type": "integer", "format": "int64" },
            "name": { "type": "string" },
            "price": { "type": "number" },
            "authorId": { "type": "integer", "format": "int64" }
        });

        let mut listed_properties = book_properties.clone();
        listed_properties["Author"] = json!({
            "oneOf": [
                { "$ref": "#/components/schemas/Author" },
                { "type": "null" }
            ]
        });

        Some(openapi::resource_paths(
            "Books",
            "Book",
            "BookWithAuthor",
            &[
                openapi::query_param("name", "string", "Case-insensitive substring match on name"),
                openapi::query_param("price", "number", "Exact price"),
                openapi::query_param("authorId", "integer", "Exact author id"),
                openapi::sort_param("id, name, price, authorId", "price:desc"),
            ],
            json!({
                "Book": {
                    "type": "object",
                    "properties": book_properties,
                    "required": ["id", "name", "price", "authorId"]
                },
                "BookWithAuthor": {
                    "type": "object",
                    "properties": listed_properties,
                    "required": ["id", "name", "price", "authorId", "Author"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "price": { "type": "number", "minimum": 0 },
                        "authorId": { "type": "integer", "minimum": 1 }
                    },
                    "required": ["name", "price", "authorId"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "price": { "type": "number", "minimum": 0 },
                        "authorId": { "type": "integer", "minimum": 1 }
                    }
                }
            }),
        ))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}
