//! Turns axum extractor rejections into the shared error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use bookstore_http::AppError;
use serde_json::json;

pub fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(AppError::bad_request(format!(
            "invalid id: {}",
            rejection.body_text()
        ))),
    }
}

pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::validation(
            vec![json!({ "field": "body", "message": rejection.body_text() })],
            "malformed request body",
        )),
    }
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
    }
}
