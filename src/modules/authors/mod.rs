pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use self::service::AuthorService;
use super::openapi;

/// Authors resource: CRUD plus filtered listing, no caching
pub struct AuthorsModule {
    service: Arc<AuthorService>,
}

impl AuthorsModule {
    pub fn new(service: Arc<AuthorService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::resource_paths(
            "Authors",
            "Author",
            "Author",
            &[
                openapi::query_param("name", "string", "Case-insensitive substring match on name"),
                openapi::query_param("age", "integer", "Exact age"),
                openapi::sort_param("id, name, age", "age:desc"),
            ],
            json!({
                "Author": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "name": { "type": "string" },
                        "age": { "type": "integer", "minimum": 1, "maximum": 120 }
                    },
                    "required": ["id", "name", "age"]
                },
                "CreateAuthor": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "age": { "type": "integer", "minimum": 1, "maximum": 120 }
                    },
                    "required": ["name", "age"]
                },
                "UpdateAuthor": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "age": { "type": "integer", "minimum": 1, "maximum": 120 }
                    }
                }
            }),
        ))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}
