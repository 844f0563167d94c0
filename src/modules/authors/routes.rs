use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bookstore_http::AppError;

use super::models::{Author, AuthorListOptions, AuthorListQuery, CreateAuthor, UpdateAuthor};
use super::service::AuthorService;
use crate::modules::extract::{json_body, path_id, query_params};
use crate::modules::query::Page;

type Service = State<Arc<AuthorService>>;

pub fn router(service: Arc<AuthorService>) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/{id}",
            get(get_author).patch(update_author).delete(delete_author),
        )
        .with_state(service)
}

async fn create_author(
    State(service): Service,
    body: Result<Json<CreateAuthor>, JsonRejection>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let input = json_body(body)?;
    let author = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

async fn list_authors(
    State(service): Service,
    query: Result<Query<AuthorListQuery>, QueryRejection>,
) -> Result<Json<Page<Author>>, AppError> {
    let options = AuthorListOptions::try_from(query_params(query)?)?;
    Ok(Json(service.list(&options).await?))
}

async fn get_author(
    State(service): Service,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(service.get(path_id(id)?).await?))
}

async fn update_author(
    State(service): Service,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateAuthor>, JsonRejection>,
) -> Result<Json<Author>, AppError> {
    let id = path_id(id)?;
    let patch = json_body(body)?;
    Ok(Json(service.update(id, patch).await?))
}

async fn delete_author(
    State(service): Service,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(service.delete(path_id(id)?).await?))
}
