use bookstore_db::{Filter, Record, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::modules::authors::models::Author;
use crate::modules::error::{ensure_valid, FieldError, ServiceError};
use crate::modules::query::{self, non_blank, Pagination, Sort, SortField};

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// Not checked against existing authors.
    pub author_id: i64,
}

/// A book as returned by listings, with its author attached under the
/// `Author` key. `null` when the referenced author no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookWithAuthor {
    #[serde(flatten)]
    pub book: Book,
    #[serde(rename = "Author")]
    pub author: Option<Author>,
}

/// Request body for creating a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub name: String,
    pub price: f64,
    pub author_id: i64,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBook {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub author_id: Option<i64>,
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "must not be empty"));
    }
}

fn check_price(price: f64, errors: &mut Vec<FieldError>) {
    if !price.is_finite() || price < 0.0 {
        errors.push(FieldError::new("price", "must be a non-negative number"));
    }
}

fn check_author_id(author_id: i64, errors: &mut Vec<FieldError>) {
    if author_id < 1 {
        errors.push(FieldError::new("authorId", "must be a positive id"));
    }
}

impl CreateBook {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        check_price(self.price, &mut errors);
        check_author_id(self.author_id, &mut errors);
        ensure_valid(errors)
    }
}

impl UpdateBook {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, &mut errors);
        }
        if let Some(price) = self.price {
            check_price(price, &mut errors);
        }
        if let Some(author_id) = self.author_id {
            check_author_id(author_id, &mut errors);
        }
        ensure_valid(errors)
    }
}

impl Record for Book {
    type Draft = CreateBook;
    type Patch = UpdateBook;

    const ENTITY: &'static str = "book";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: CreateBook) -> Self {
        Self {
            id,
            name: draft.name,
            price: draft.price,
            author_id: draft.author_id,
        }
    }

    fn apply(&mut self, patch: UpdateBook) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(author_id) = patch.author_id {
            self.author_id = author_id;
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "price" => Some(self.price.into()),
            "authorId" => Some(self.author_id.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookSortField {
    #[default]
    Id,
    Name,
    Price,
    AuthorId,
}

impl SortField for BookSortField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name, Self::Price, Self::AuthorId];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price",
            Self::AuthorId => "authorId",
        }
    }
}

/// Raw `GET /api/books` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListQuery {
    pub name: Option<String>,
    pub price: Option<String>,
    pub author_id: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated book listing options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookListOptions {
    /// Case-insensitive substring match on `name`.
    pub name: Option<String>,
    pub price: Option<f64>,
    pub author_id: Option<i64>,
    pub sort: Sort<BookSortField>,
    pub pagination: Pagination,
}

impl TryFrom<BookListQuery> for BookListOptions {
    type Error = ServiceError;

    fn try_from(raw: BookListQuery) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();
        let price: Option<f64> = query::parse_param("price", raw.price.as_deref(), &mut errors);
        if price.is_some_and(|p| !p.is_finite()) {
            errors.push(FieldError::new("price", "must be a finite number"));
        }

        let options = Self {
            name: non_blank(raw.name.as_deref()).map(str::to_string),
            price,
            author_id: query::parse_param("authorId", raw.author_id.as_deref(), &mut errors),
            sort: query::parse_sort(raw.sort.as_deref(), &mut errors),
            pagination: Pagination::parse(raw.page.as_deref(), raw.limit.as_deref(), &mut errors),
        };
        ensure_valid(errors)?;
        Ok(options)
    }
}

impl BookListOptions {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(name) = &self.name {
            filter = filter.contains("name", name.as_str());
        }
        if let Some(price) = self.price {
            filter = filter.equals("price", price);
        }
        if let Some(author_id) = self.author_id {
            filter = filter.equals("authorId", author_id);
        }
        filter
    }

    /// Listing cache key: one entry per distinct, fully-defaulted option set.
    pub fn cache_key(&self) -> String {
        let shape = json!({
            "name": self.name,
            "price": self.price,
            "authorId": self.author_id,
            "sort": self.sort.to_string(),
            "page": self.pagination.page,
            "limit": self.pagination.limit,
        });
        format!("books:{}", shape)
    }
}

pub fn book_cache_key(id: i64) -> String {
    format!("book:{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_db::SortDirection;

    #[test]
    fn serializes_with_camel_case_author_id() {
        let book = Book {
            id: 1,
            name: "1984".into(),
            price: 12.0,
            author_id: 3,
        };
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value, json!({"id": 1, "name": "1984", "price": 12.0, "authorId": 3}));

        let listed = BookWithAuthor { book, author: None };
        let value = serde_json::to_value(&listed).unwrap();
        assert_eq!(value["authorId"], 3);
        assert!(value["Author"].is_null());
        assert!(value.get("author").is_none());
    }

    #[test]
    fn create_validation() {
        let err = CreateBook {
            name: "".into(),
            price: -1.0,
            author_id: 0,
        }
        .validate()
        .unwrap_err();
        match err {
            ServiceError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "price", "authorId"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn list_query_parses_numeric_filters() {
        let options = BookListOptions::try_from(BookListQuery {
            price: Some("12.5".into()),
            author_id: Some("3".into()),
            sort: Some("price:desc".into()),
            ..BookListQuery::default()
        })
        .unwrap();

        assert_eq!(options.price, Some(12.5));
        assert_eq!(options.author_id, Some(3));
        assert_eq!(options.sort, Sort::new(BookSortField::Price, SortDirection::Desc));
        assert_eq!(options.filter().conditions().count(), 2);
    }

    #[test]
    fn list_query_rejects_non_finite_price() {
        let err = BookListOptions::try_from(BookListQuery {
            price: Some("NaN".into()),
            ..BookListQuery::default()
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn cache_key_is_deterministic_and_distinguishes_queries() {
        let a = BookListOptions::try_from(BookListQuery {
            name: Some("dune".into()),
            ..BookListQuery::default()
        })
        .unwrap();
        let b = BookListOptions::try_from(BookListQuery {
            name: Some("dune".into()),
            sort: Some("id:asc".into()),
            page: Some("1".into()),
            ..BookListQuery::default()
        })
        .unwrap();
        let c = BookListOptions {
            pagination: Pagination { page: 2, limit: 10 },
            ..a.clone()
        };

        assert!(a.cache_key().starts_with("books:"));
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), c.cache_key());
        assert_eq!(book_cache_key(42), "book:42");
    }
}
