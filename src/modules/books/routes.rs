use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bookstore_http::AppError;

use super::models::{
    Book, BookListOptions, BookListQuery, BookWithAuthor, CreateBook, UpdateBook,
};
use super::service::BookService;
use crate::modules::extract::{json_body, path_id, query_params};
use crate::modules::query::Page;

type Service = State<Arc<BookService>>;

pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn create_book(
    State(service): Service,
    body: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let input = json_body(body)?;
    let book = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(
    State(service): Service,
    query: Result<Query<BookListQuery>, QueryRejection>,
) -> Result<Json<Page<BookWithAuthor>>, AppError> {
    let options = BookListOptions::try_from(query_params(query)?)?;
    Ok(Json(service.list(&options).await?))
}

async fn get_book(
    State(service): Service,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(path_id(id)?).await?))
}

async fn update_book(
    State(service): Service,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = path_id(id)?;
    let patch = json_body(body)?;
    Ok(Json(service.update(id, patch).await?))
}

async fn delete_book(
    State(service): Service,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.delete(path_id(id)?).await?))
}
