use bookstore_db::{Filter, Record, Value};
use serde::{Deserialize, Serialize};

use crate::modules::error::{ensure_valid, FieldError, ServiceError};
use crate::modules::query::{self, non_blank, Pagination, Sort, SortField};

pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 120;

/// A persisted author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

/// Request body for creating an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthor {
    pub name: String,
    pub age: i32,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "must not be empty"));
    }
}

fn check_age(age: i32, errors: &mut Vec<FieldError>) {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        errors.push(FieldError::new(
            "age",
            format!("must be between {} and {}", MIN_AGE, MAX_AGE),
        ));
    }
}

impl CreateAuthor {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        check_age(self.age, &mut errors);
        ensure_valid(errors)
    }
}

impl UpdateAuthor {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, &mut errors);
        }
        if let Some(age) = self.age {
            check_age(age, &mut errors);
        }
        ensure_valid(errors)
    }
}

impl Record for Author {
    type Draft = CreateAuthor;
    type Patch = UpdateAuthor;

    const ENTITY: &'static str = "author";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: CreateAuthor) -> Self {
        Self {
            id,
            name: draft.name,
            age: draft.age,
        }
    }

    fn apply(&mut self, patch: UpdateAuthor) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "age" => Some(self.age.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorSortField {
    #[default]
    Id,
    Name,
    Age,
}

impl SortField for AuthorSortField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name, Self::Age];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Age => "age",
        }
    }
}

/// Raw `GET /api/authors` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorListQuery {
    pub name: Option<String>,
    pub age: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated author listing options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorListOptions {
    /// Case-insensitive substring match on `name`.
    pub name: Option<String>,
    pub age: Option<i32>,
    pub sort: Sort<AuthorSortField>,
    pub pagination: Pagination,
}

impl TryFrom<AuthorListQuery> for AuthorListOptions {
    type Error = ServiceError;

    fn try_from(raw: AuthorListQuery) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();
        let options = Self {
            name: non_blank(raw.name.as_deref()).map(str::to_string),
            age: query::parse_param("age", raw.age.as_deref(), &mut errors),
            sort: query::parse_sort(raw.sort.as_deref(), &mut errors),
            pagination: Pagination::parse(raw.page.as_deref(), raw.limit.as_deref(), &mut errors),
        };
        ensure_valid(errors)?;
        Ok(options)
    }
}

impl AuthorListOptions {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(name) = &self.name {
            filter = filter.contains("name", name.as_str());
        }
        if let Some(age) = self.age {
            filter = filter.equals("age", age);
        }
        filter
    }
}
