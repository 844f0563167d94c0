//! Service-level failures and their mapping onto HTTP errors.

use bookstore_cache::CacheError;
use bookstore_db::DbError;
use bookstore_http::AppError;
use serde::Serialize;
use thiserror::Error;

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Fault raised by one of the backing stores.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("persistence: {0}")]
    Persistence(#[from] DbError),

    #[error("cache: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid {}", field_list(.0))]
    Validation(Vec<FieldError>),

    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        Self::Gateway(err.into())
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        Self::Gateway(err.into())
    }
}

/// Turns collected field errors into a validation failure, if any.
pub fn ensure_valid(errors: Vec<FieldError>) -> ServiceResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

fn field_list(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => AppError::not_found(err.to_string()),
            ServiceError::Validation(errors) => {
                let details = errors
                    .iter()
                    .map(|e| serde_json::json!({ "field": e.field, "message": e.message }))
                    .collect();
                AppError::validation(details, format!("invalid {}", field_list(&errors)))
            }
            ServiceError::Gateway(source) => AppError::Internal(source.into()),
        }
    }
}
